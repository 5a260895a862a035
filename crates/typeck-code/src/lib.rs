//! Canonical bytecode for type-expression equality.
//!
//! The encoder flattens a type AST into a sequence of 16-bit instruction
//! words such that two structurally α-equivalent types (under the same
//! scope tree) produce byte-identical strings — this is what lets
//! `typeck-unify`'s trait-impl index use plain map lookups instead of a
//! structural equality pass.

pub mod disasm;
pub mod kind;
pub mod op;

mod code;
mod compile;
mod decode;

pub use code::{narrow_id, TypeCode, Word};
pub use compile::{compile, VarResolver};
pub use decode::{decode, DecodedKind, DecodedType, ForallDescriptor};
pub use kind::encode_kind;
pub use op::Op;
