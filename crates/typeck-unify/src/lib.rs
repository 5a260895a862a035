//! Structural unification over `TypeExpr` (spec §4.4) and the trait-impl
//! index it consults for constraint discharge (spec §4.5).

mod impl_index;
mod state;
mod unifier;

pub use impl_index::{trait_application_code, Impl, TraitImplIndex};
pub use state::UnifyState;
pub use unifier::Unifier;
