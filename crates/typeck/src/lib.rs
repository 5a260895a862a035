//! Public facade over the `typeck-*` workspace.
//!
//! The core is split into small crates along dependency-direction lines
//! (`typeck-common` → `typeck-ast` → `typeck-code`/`typeck-scope` →
//! `typeck-kind` → `typeck-unify`) so that none of them depends on more
//! than it needs; this crate re-exports the pieces an external caller
//! actually touches (spec §6's three boundary surfaces: AST ingress, the
//! checker API, and the single error type) as one flat surface, and adds
//! [`check`], the top-level gate that the split forced out of
//! `typeck-scope::Context` and into its own module.

mod checker;

pub use checker::check;

// AST ingress: constructors for every AST variant, the arena that owns
// them, and the entity table `Ref`/`Var` point into.
pub use typeck_ast::{
    Alias, Arena, Constraint, Data, DataConstructor, Entities, EntityDef, Kind, Method, Param,
    ScopeNode, Trait, TypeExpr, TypeNodeId,
};

// Canonical type codes: the encoder, decoder and disassembler.
pub use typeck_code::{
    compile, decode, disasm, encode_kind, narrow_id, DecodedKind, DecodedType, ForallDescriptor,
    Op, TypeCode, VarResolver, Word,
};

// The error surface and the id/config types threaded through everything.
pub use typeck_common::{CheckError, CheckerConfig, EntityId, Namespace, Repository};

// Scope resolution and normalization.
pub use typeck_scope::{Context, ContextId};

// Kind checking.
pub use typeck_kind::{kind, HoleEnv, NoHoles};

// Unification and the trait-impl index.
pub use typeck_unify::{trait_application_code, Impl, TraitImplIndex, UnifyState, Unifier};
