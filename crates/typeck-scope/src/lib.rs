//! The lexical scope tree: entity definitions, name resolution, depth
//! bookkeeping, and `TypeCode` normalization memoized per AST node.
//!
//! Mirrors `tsz-binder`'s role in the teacher (a `Context` tree built
//! ahead of checking, queried read-mostly afterward) scaled to this
//! core's single-file-worth of scope kinds (`ScopeNode`) instead of
//! `tsz-binder`'s `ContainerKind`/`ScopeId` machinery.

mod context;

pub use context::{Context, ContextId};
