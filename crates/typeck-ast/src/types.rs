//! The type-expression node shape and the top-level entities that own
//! them.
//!
//! `TypeExpr` mirrors spec §3.1's table directly. Two constructor-like
//! fields are deliberately *not* `EntityId`: `Apply::head` and
//! `Var`. `Apply::head` is a full `TypeNodeId` rather than a bare entity
//! reference because a higher-kinded bound variable can appear in head
//! position (`T<U>` where `T` is itself a `Var`, not a `Ref`) — collapsing
//! it to `EntityId` would make that inexpressible. `Var` carries the raw
//! occurrence name rather than a pre-resolved id because resolution is a
//! `Context`-dependent, cached operation (`Context::resolve_var`), not a
//! property of the node itself.

use crate::arena::TypeNodeId;
use typeck_common::EntityId;

/// A type-level expression node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// An unresolved hole introduced by a `Partial` scope.
    Hole(EntityId),
    /// A node with some of its holes already assigned, carrying its own
    /// identity plus the assignment list and the inner expression they
    /// apply to.
    Partial {
        id: EntityId,
        holes: Vec<EntityId>,
        inner: TypeNodeId,
    },
    /// Universal quantification over one or more parameters.
    Forall {
        params: Vec<EntityId>,
        body: TypeNodeId,
    },
    /// Type-constructor application. `head` is itself a type expression
    /// so that higher-kinded bound variables can appear in head position.
    Apply {
        head: TypeNodeId,
        args: Vec<TypeNodeId>,
    },
    /// A fixed-arity product type.
    Tuple(Vec<TypeNodeId>),
    /// A function type: its own generic parameters, its value parameter
    /// types, and its return type.
    Fun {
        tparams: Vec<EntityId>,
        params: Vec<TypeNodeId>,
        ret: TypeNodeId,
    },
    /// A pre-resolved reference to a top-level entity (`Alias`, `Data`,
    /// `Param`, or a synthetic tuple-arity entity — see
    /// `Context::resolve_id`).
    Ref(EntityId),
    /// An unresolved textual variable occurrence, resolved against the
    /// enclosing `Context` on first use and cached by the arena id of
    /// this node.
    Var(String),
}

/// A named, generic type alias: `alias Name<params> = body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub id: EntityId,
    pub name: String,
    pub params: Vec<EntityId>,
    pub body: TypeNodeId,
}

/// A named, generic algebraic data type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Data {
    pub id: EntityId,
    pub name: String,
    pub params: Vec<EntityId>,
    pub constructors: Vec<DataConstructor>,
}

/// One constructor of a [`Data`] definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataConstructor {
    pub id: EntityId,
    pub name: String,
    pub fields: Vec<TypeNodeId>,
}

/// A trait: its own parameters, any associated (method-scoped) parameters,
/// its super-trait constraints, and its methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trait {
    pub id: EntityId,
    pub name: String,
    pub params: Vec<EntityId>,
    pub supertraits: Vec<Constraint>,
    pub methods: Vec<Method>,
}

/// One method signature declared inside a [`Trait`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub id: EntityId,
    pub name: String,
    pub signature: TypeNodeId,
}

/// A type parameter: its own identity, an optional kind annotation when
/// the parameter is itself higher-kinded, and the constraints it must
/// discharge at instantiation.
///
/// `kind` and `constraints` are mutually exclusive in a well-formed
/// program (spec §4.3: "constraints are only placed on concrete-kinded
/// type parameters") but that invariant is enforced by `typeck-kind`, not
/// by this type — the AST layer stores whatever a parser handed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub id: EntityId,
    pub name: String,
    pub kind: Option<Kind>,
    pub constraints: Vec<Constraint>,
}

/// The kind of a type: concrete (`*`) or a type-constructor arrow.
///
/// Owned by this crate rather than by `typeck-kind` because it is part of
/// a `Param`'s declared shape, not just an inference result — `typeck-code`
/// also needs it, to compile a `Forall`'s HKT parameter header (spec
/// §4.1: "Forall with HKT parameter: emit Forall, then the kind").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Concrete,
    Arrow(Box<Kind>, Box<Kind>),
}

/// A trait bound on a parameter: `trait_id` applied to `args`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub trait_id: EntityId,
    pub args: Vec<TypeNodeId>,
}
