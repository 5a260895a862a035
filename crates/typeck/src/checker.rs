//! The relocated top-level gate (spec §4.2's `Context::check`).
//!
//! Lives here rather than on `typeck_scope::Context` itself because it
//! composes the kind checker and the unifier, both of which sit above
//! `typeck-scope` in the dependency graph — folding it back into
//! `typeck-scope` would create a cycle (`typeck-unify` already depends on
//! `typeck-scope` for `Context`/`ContextId`).

use tracing::{span, Level};

use typeck_ast::TypeNodeId;
use typeck_common::CheckError;
use typeck_kind::HoleEnv;
use typeck_scope::{Context, ContextId};
use typeck_unify::{TraitImplIndex, UnifyState, Unifier};

/// Check `node`: recursively validate kinds, resolved names and arities
/// (`typeck_kind::check`), then confirm the well-kinded result actually
/// unifies with itself. The second half operationalizes the reflexivity
/// and kind-soundness properties as a runtime invariant rather than a
/// test-only assertion — a well-kinded node that fails to unify with
/// itself means this crate has a bug, not that the input is malformed.
pub fn check(
    ctx: &mut Context,
    ctx_id: ContextId,
    node: TypeNodeId,
    holes: &dyn HoleEnv,
    impls: &TraitImplIndex,
) -> Result<(), CheckError> {
    let _span = span!(Level::DEBUG, "check", node = node.raw()).entered();
    typeck_kind::check(ctx, ctx_id, node, holes)?;

    let unifier = Unifier::new(impls);
    let mut state = UnifyState::new();
    if !unifier.unify(ctx, ctx_id, &mut state, node, node) {
        return Err(CheckError::UnifyFail {
            reason: "a well-kinded type failed to unify with itself".to_string(),
        });
    }
    Ok(())
}
