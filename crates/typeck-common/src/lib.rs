//! Shared types for the typeck core: entity ids, the id allocator, the
//! single checker error enum, and checker configuration.
//!
//! This crate sits below every other `typeck-*` crate so that `typeck-ast`,
//! `typeck-code`, `typeck-scope`, `typeck-kind` and `typeck-unify` can all
//! share one id space and one error type without creating a dependency
//! cycle.

pub mod config;
pub mod error;
pub mod ids;

pub use config::CheckerConfig;
pub use error::{CheckError, Namespace};
pub use ids::{EntityId, Repository};
