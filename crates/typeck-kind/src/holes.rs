//! Hole-fill lookup, abstracted behind a trait.
//!
//! `typeck-kind` sits below `typeck-unify` in the dependency order, so it
//! cannot reach the unifier's hole-assignment map directly — callers that
//! have one (the unifier, or the umbrella checker) pass it in as a
//! `&dyn HoleEnv`; callers doing a bare consistency check pass
//! [`NoHoles`], matching spec §4.3's "or, when only a consistency check
//! is desired, `*`" fallback.

use typeck_ast::Kind;
use typeck_common::EntityId;

pub trait HoleEnv {
    /// The kind of whatever `hole` is currently filled with, or `None`
    /// if it is still unresolved.
    fn hole_kind(&self, hole: EntityId) -> Option<Kind>;
}

/// A `HoleEnv` that treats every hole as filled with something concrete —
/// the "consistency check only" mode spec §4.3 allows for.
pub struct NoHoles;

impl HoleEnv for NoHoles {
    fn hole_kind(&self, _hole: EntityId) -> Option<Kind> {
        Some(Kind::Concrete)
    }
}
