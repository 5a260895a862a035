//! AST shape the checker core relies on: an arena of type-expression nodes
//! plus the top-level entity definitions (`Alias`, `Data`, `Trait`,
//! `Param`) that own them.
//!
//! External parsers are the only producers of these types (see the crate
//! root's scope note — lexing/parsing is out of scope for this core).
//! Everything here is immutable once built: `Arena::alloc` is the only way
//! to create a `TypeNodeId`, and nothing in this crate ever mutates a node
//! after allocation.

pub mod arena;
pub mod entities;
pub mod scope_node;
pub mod types;

pub use arena::{Arena, TypeNodeId};
pub use entities::{EntityDef, Entities};
pub use scope_node::ScopeNode;
pub use types::{Alias, Constraint, Data, DataConstructor, Kind, Method, Param, Trait, TypeExpr};
