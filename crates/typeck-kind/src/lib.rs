//! The kind algebra: `* | kind -> kind`, and the checker that validates
//! every application against it (spec §4.3).

mod checker;
mod holes;

pub use checker::{check, kind};
pub use holes::{NoHoles, HoleEnv};
