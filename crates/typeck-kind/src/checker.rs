//! `kind` and `check` (spec §4.3).
//!
//! Both assume every quantifier scope reachable from `node` has already
//! been entered and had its parameters defined (`Context::enter` +
//! `Context::define_params`) — that happens once, at AST-ingestion time,
//! not lazily here; `enter` is idempotent so re-entering a scope that
//! already exists is always safe, but *re-defining* its params would
//! raise a spurious `Redeclaration`, which is why this module never
//! calls `define_params` itself.

use typeck_ast::{Kind, TypeExpr, TypeNodeId};
use typeck_common::CheckError;
use typeck_scope::{Context, ContextId};

use crate::holes::HoleEnv;

/// The kind of `node`, or `None` if `node` is ill-formed (spec §4.3:
/// "total function on well-formed types... undefined on malformed
/// ones").
pub fn kind(ctx: &mut Context, ctx_id: ContextId, node: TypeNodeId, holes: &dyn HoleEnv) -> Option<Kind> {
    match ctx.arena().get(node).clone() {
        TypeExpr::Hole(h) => holes.hole_kind(h),
        TypeExpr::Partial { inner, .. } => kind(ctx, ctx_id, inner, holes),
        TypeExpr::Forall { .. } | TypeExpr::Fun { .. } | TypeExpr::Tuple(_) => Some(Kind::Concrete),
        TypeExpr::Var(_) => {
            let target = ctx.resolve_var(ctx_id, node).ok()?;
            match ctx.entities().param(target) {
                Some(param) => Some(param.kind.clone().unwrap_or(Kind::Concrete)),
                None => None,
            }
        }
        TypeExpr::Ref(id) => ctx.entities().get(id).map(|def| curried_kind(def.param_count())),
        TypeExpr::Apply { head, args } => {
            let mut current = kind(ctx, ctx_id, head, holes)?;
            for arg in args {
                let Kind::Arrow(from, to) = current else {
                    // Applying a concrete head is a type error (spec §4.3).
                    return None;
                };
                let arg_kind = kind(ctx, ctx_id, arg, holes)?;
                // The known defect this spec calls out: compare the
                // parameter-kind (`from`) against the *argument's* kind,
                // never against itself.
                if arg_kind != *from {
                    return None;
                }
                current = *to;
            }
            Some(current)
        }
    }
}

fn curried_kind(param_count: usize) -> Kind {
    (0..param_count).fold(Kind::Concrete, |acc, _| Kind::Arrow(Box::new(Kind::Concrete), Box::new(acc)))
}

/// Recursively validate `node`: every application respects the arrow
/// law, every `Ref` resolves, every `Var` is in range.
pub fn check(ctx: &mut Context, ctx_id: ContextId, node: TypeNodeId, holes: &dyn HoleEnv) -> Result<(), CheckError> {
    match ctx.arena().get(node).clone() {
        TypeExpr::Hole(_) => Ok(()),
        TypeExpr::Partial { inner, .. } => check(ctx, ctx_id, inner, holes),
        TypeExpr::Forall { body, .. } => check(ctx, ctx_id, body, holes),
        TypeExpr::Tuple(elems) => {
            for elem in elems {
                check(ctx, ctx_id, elem, holes)?;
            }
            Ok(())
        }
        TypeExpr::Fun { params, ret, .. } => {
            for param in params {
                check(ctx, ctx_id, param, holes)?;
            }
            check(ctx, ctx_id, ret, holes)
        }
        TypeExpr::Ref(id) => {
            if ctx.entities().get(id).is_some() {
                Ok(())
            } else {
                Err(CheckError::NotFound {
                    name: format!("entity#{}", id.raw()),
                })
            }
        }
        TypeExpr::Var(ref name) => {
            let name = name.clone();
            ctx.resolve_var(ctx_id, node)
                .map(|_| ())
                .map_err(|_| CheckError::NotFound { name })
        }
        TypeExpr::Apply { head, ref args } => {
            check(ctx, ctx_id, head, holes)?;
            for &arg in args {
                check(ctx, ctx_id, arg, holes)?;
            }
            let Some(_) = kind(ctx, ctx_id, node, holes) else {
                let head_kind = kind(ctx, ctx_id, head, holes);
                return Err(CheckError::KindMismatch {
                    expected: head_kind.map_or_else(|| "?".to_string(), |k| format!("{k:?}")),
                    found: format!("{} argument(s)", args.len()),
                });
            };
            Ok(())
        }
    }
}
