//! The AST nodes that anchor a lexical scope.
//!
//! `typeck-scope::Context` keys its child-context index and its root by
//! `ScopeNode`, not by a raw `TypeNodeId` — not every node introduces a
//! scope, and a handful of entity kinds (`Data`, `Trait`) introduce one
//! without being addressed by a `TypeNodeId` at all (they live in the
//! entity tables, not the arena).

use crate::arena::TypeNodeId;
use typeck_common::EntityId;

/// A node that a `Context` can be built for.
///
/// Depth bookkeeping (spec §3.2) only increments across the variants that
/// bind type parameters — [`ScopeNode::introduces_type_params`] is the
/// single source of truth both `typeck-scope` and `typeck-code` consult.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeNode {
    /// The implicit outermost scope. Depth 0, no parent.
    Root,
    /// A `Forall` node's own parameter list and body.
    Forall(TypeNodeId),
    /// An `Alias`'s parameter list and body.
    AliasParams(EntityId),
    /// A `Data`'s parameter list and constructors.
    DataParams(EntityId),
    /// A `Trait`'s own params, associated params, super-traits and
    /// methods.
    TraitParams(EntityId),
    /// A `Fun` node's own generic parameter list (`tparams`).
    FunTParams(TypeNodeId),
    /// A `Partial` node's enclosed holes. Introduces holes, not
    /// parameters, so it never bumps depth (see the glossary: "Partial: a
    /// scope that introduces holes, as opposed to parameters").
    Partial(TypeNodeId),
}

impl ScopeNode {
    /// Whether entering this scope increments `Context::depth` (spec
    /// §3.2: "a non-root context's depth equals its parent's depth plus
    /// one when it introduces type parameters ... otherwise equals its
    /// parent's depth").
    #[must_use]
    pub const fn introduces_type_params(self) -> bool {
        !matches!(self, ScopeNode::Root | ScopeNode::Partial(_))
    }
}
