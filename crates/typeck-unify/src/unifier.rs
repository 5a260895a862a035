//! `Unifier::unify` (spec §4.4.2) and `instantiate` (spec §4.4.3).

use tracing::{span, Level};

use typeck_ast::{Constraint, Kind, TypeExpr, TypeNodeId};
use typeck_common::EntityId;
use typeck_kind::HoleEnv;
use typeck_scope::{Context, ContextId};

use crate::impl_index::{trait_application_code, TraitImplIndex};
use crate::state::UnifyState;

struct HoleEnvAdapter<'s> {
    state: &'s UnifyState,
}

impl HoleEnv for HoleEnvAdapter<'_> {
    fn hole_kind(&self, hole: EntityId) -> Option<Kind> {
        self.state.hole_kind(hole)
    }
}

/// Unifies two type expressions against a shared trait-impl index.
///
/// Stateless itself (all mutable state lives in the caller-owned
/// [`UnifyState`]) so one `Unifier` can check many independent pairs
/// against the same index.
pub struct Unifier<'i> {
    impls: &'i TraitImplIndex,
}

impl<'i> Unifier<'i> {
    #[must_use]
    pub fn new(impls: &'i TraitImplIndex) -> Self {
        Self { impls }
    }

    /// Attempt to unify `lhs` and `rhs`, recording hole assignments and
    /// parameter captures into `state` along the way. Not transactional:
    /// on failure `state` is left exactly as far as the algorithm got
    /// (spec §4.4.4) — snapshot `state.clone()` first for speculation.
    pub fn unify(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, lhs: TypeNodeId, rhs: TypeNodeId) -> bool {
        let _span = span!(Level::TRACE, "unify", lhs = lhs.raw(), rhs = rhs.raw()).entered();
        self.unify_at(ctx, ctx_id, state, lhs, rhs, 0)
    }

    fn unify_at(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, lhs: TypeNodeId, rhs: TypeNodeId, depth: usize) -> bool {
        if depth > ctx.config().max_recursion_depth {
            tracing::warn!(depth, "unify: recursion guard tripped, treating as failure");
            return false;
        }

        let lhs = strip_partial(ctx, lhs);
        let rhs = strip_partial(ctx, rhs);

        // Rule 1: a bound variable on either side attempts instantiation.
        if let TypeExpr::Var(_) = ctx.arena().get(lhs) {
            if let Ok(id) = ctx.resolve_var(ctx_id, lhs) {
                if state.is_lhs_param(id) {
                    return self.instantiate_and_capture(ctx, ctx_id, state, id, rhs, depth);
                }
            }
        }
        if let TypeExpr::Var(_) = ctx.arena().get(rhs) {
            if let Ok(id) = ctx.resolve_var(ctx_id, rhs) {
                if state.is_rhs_param(id) {
                    return self.instantiate_and_capture(ctx, ctx_id, state, id, lhs, depth);
                }
            }
        }

        // Rule 2 ("Kind on either side: fatal") has no counterpart here:
        // `TypeNodeId` never addresses a bare `Kind`, only `TypeExpr`
        // nodes, so this case cannot arise through this signature.

        // Rule 3: Forall on either side.
        let lhs_is_forall = matches!(ctx.arena().get(lhs), TypeExpr::Forall { .. });
        let rhs_is_forall = matches!(ctx.arena().get(rhs), TypeExpr::Forall { .. });
        if lhs_is_forall || rhs_is_forall {
            return self.unify_forall(ctx, ctx_id, state, lhs, rhs, depth);
        }

        // Rule 4: Hole on either side.
        let lhs_hole = hole_id(ctx, lhs);
        let rhs_hole = hole_id(ctx, rhs);
        if lhs_hole.is_some() || rhs_hole.is_some() {
            return self.unify_hole(ctx, ctx_id, state, lhs, rhs, lhs_hole, rhs_hole, depth);
        }

        // Rules 5-9: structural dispatch.
        self.unify_structural(ctx, ctx_id, state, lhs, rhs, depth)
    }

    fn instantiate_and_capture(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, param: EntityId, candidate: TypeNodeId, depth: usize) -> bool {
        if !self.instantiate(ctx, ctx_id, state, param, candidate) {
            return false;
        }
        let prior = state.capture(param, candidate);
        prior.iter().all(|&previous| self.unify_at(ctx, ctx_id, state, previous, candidate, depth + 1))
    }

    /// `instantiate(param, type, rhsParams) -> bool` (spec §4.4.3).
    /// `rhsParams` is not threaded separately: a candidate's kind is
    /// resolved through `kind::kind`, which already looks up `Var`
    /// occurrences via `Context::entities()` regardless of which side
    /// originally declared them.
    fn instantiate(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, param: EntityId, candidate: TypeNodeId) -> bool {
        let Some(declared) = ctx.entities().param(param).cloned() else {
            return false;
        };
        for constraint in &declared.constraints {
            if !self.discharges(ctx, ctx_id, constraint, candidate) {
                return false;
            }
        }
        if let Some(declared_kind) = &declared.kind {
            let adapter = HoleEnvAdapter { state };
            let Some(candidate_kind) = typeck_kind::kind(ctx, ctx_id, candidate, &adapter) else {
                return false;
            };
            if typeck_code::encode_kind(declared_kind) != typeck_code::encode_kind(&candidate_kind) {
                return false;
            }
        }
        true
    }

    fn discharges(&self, ctx: &mut Context, ctx_id: ContextId, constraint: &Constraint, candidate: TypeNodeId) -> bool {
        let arg_codes: Result<Vec<_>, _> = constraint.args.iter().map(|&arg| ctx.normalize(ctx_id, arg)).collect();
        let Ok(arg_codes) = arg_codes else {
            return false;
        };
        let Ok(trait_code) = trait_application_code(constraint.trait_id, &arg_codes) else {
            return false;
        };
        let Ok(candidate_code) = ctx.normalize(ctx_id, candidate) else {
            return false;
        };
        self.impls.contains(&trait_code, &candidate_code)
    }

    fn unify_forall(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, lhs: TypeNodeId, rhs: TypeNodeId, depth: usize) -> bool {
        let (lhs_params, lhs_body) = unwrap_foralls(ctx, lhs);
        let (rhs_params, rhs_body) = unwrap_foralls(ctx, rhs);
        let lhs_is_fun = matches!(ctx.arena().get(lhs_body), TypeExpr::Fun { .. });
        let rhs_is_fun = matches!(ctx.arena().get(rhs_body), TypeExpr::Fun { .. });
        if !lhs_is_fun || !rhs_is_fun {
            // Existentials: unify only by node identity.
            return lhs_body == rhs_body;
        }
        let mark = state.push_params(&lhs_params, &rhs_params);
        let ok = self.unify_at(ctx, ctx_id, state, lhs_body, rhs_body, depth + 1);
        state.truncate_params(mark);
        ok
    }

    fn unify_hole(
        &self,
        ctx: &mut Context,
        ctx_id: ContextId,
        state: &mut UnifyState,
        lhs: TypeNodeId,
        rhs: TypeNodeId,
        lhs_hole: Option<EntityId>,
        rhs_hole: Option<EntityId>,
        depth: usize,
    ) -> bool {
        match (lhs_hole, rhs_hole) {
            (Some(a), Some(b)) if a == b => true,
            (Some(a), Some(b)) => match (state.hole_assignment(a), state.hole_assignment(b)) {
                (None, None) => false, // bottom vs bottom (spec §4.4.2 rule 4, Open Question #3)
                (Some(av), None) => {
                    let k = state.hole_kind(a).unwrap_or(Kind::Concrete);
                    state.assign_hole(b, av, k);
                    true
                }
                (None, Some(bv)) => {
                    let k = state.hole_kind(b).unwrap_or(Kind::Concrete);
                    state.assign_hole(a, bv, k);
                    true
                }
                (Some(av), Some(bv)) => self.unify_at(ctx, ctx_id, state, av, bv, depth + 1),
            },
            (Some(a), None) => match state.hole_assignment(a) {
                Some(assigned) => self.unify_at(ctx, ctx_id, state, assigned, rhs, depth + 1),
                None => {
                    self.assign_hole_with_kind(ctx, ctx_id, state, a, rhs);
                    true
                }
            },
            (None, Some(b)) => match state.hole_assignment(b) {
                Some(assigned) => self.unify_at(ctx, ctx_id, state, lhs, assigned, depth + 1),
                None => {
                    self.assign_hole_with_kind(ctx, ctx_id, state, b, lhs);
                    true
                }
            },
            (None, None) => unreachable!("unify_hole called without a hole on either side"),
        }
    }

    fn assign_hole_with_kind(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, hole: EntityId, ty: TypeNodeId) {
        let kind = {
            let adapter = HoleEnvAdapter { state };
            typeck_kind::kind(ctx, ctx_id, ty, &adapter).unwrap_or(Kind::Concrete)
        };
        state.assign_hole(hole, ty, kind);
    }

    fn unify_structural(&self, ctx: &mut Context, ctx_id: ContextId, state: &mut UnifyState, lhs: TypeNodeId, rhs: TypeNodeId, depth: usize) -> bool {
        let lhs_expr = ctx.arena().get(lhs).clone();
        let rhs_expr = ctx.arena().get(rhs).clone();
        match (lhs_expr, rhs_expr) {
            (TypeExpr::Apply { head: lh, args: la }, TypeExpr::Apply { head: rh, args: ra }) => {
                la.len() == ra.len()
                    && self.unify_at(ctx, ctx_id, state, lh, rh, depth + 1)
                    && la.iter().zip(ra.iter()).all(|(&l, &r)| self.unify_at(ctx, ctx_id, state, l, r, depth + 1))
            }
            (TypeExpr::Tuple(la), TypeExpr::Tuple(ra)) => {
                la.len() == ra.len() && la.iter().zip(ra.iter()).all(|(&l, &r)| self.unify_at(ctx, ctx_id, state, l, r, depth + 1))
            }
            (TypeExpr::Fun { tparams: lt, params: lp, ret: lr }, TypeExpr::Fun { tparams: rt, params: rp, ret: rr }) => {
                self.unify_fun(ctx, ctx_id, state, &lt, lp, lr, &rt, rp, rr, depth)
            }
            (TypeExpr::Ref(_) | TypeExpr::Var(_), TypeExpr::Ref(_) | TypeExpr::Var(_)) => self.unify_identity(ctx, ctx_id, lhs, rhs),
            // Rule 5: different top-level operators fail.
            _ => false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn unify_fun(
        &self,
        ctx: &mut Context,
        ctx_id: ContextId,
        state: &mut UnifyState,
        lhs_tparams: &[EntityId],
        lhs_params: Vec<TypeNodeId>,
        lhs_ret: TypeNodeId,
        rhs_tparams: &[EntityId],
        rhs_params: Vec<TypeNodeId>,
        rhs_ret: TypeNodeId,
        depth: usize,
    ) -> bool {
        if lhs_tparams.len() != rhs_tparams.len() || lhs_params.len() != rhs_params.len() {
            return false;
        }
        let mark = state.push_params(lhs_tparams, rhs_tparams);
        // Contravariance: swap which stack each side's bound variables
        // live on, and swap the argument order to match, so a variable
        // quantified on (say) the lhs function is instantiated from
        // whatever sits in the corresponding rhs parameter slot, not the
        // other way around.
        state.swap();
        let params_ok = lhs_params
            .iter()
            .zip(rhs_params.iter())
            .all(|(&l, &r)| self.unify_at(ctx, ctx_id, state, r, l, depth + 1));
        state.swap();
        let ok = params_ok && self.unify_at(ctx, ctx_id, state, lhs_ret, rhs_ret, depth + 1);
        state.truncate_params(mark);
        ok
    }

    fn unify_identity(&self, ctx: &mut Context, ctx_id: ContextId, lhs: TypeNodeId, rhs: TypeNodeId) -> bool {
        matches!((entity_ref(ctx, ctx_id, lhs), entity_ref(ctx, ctx_id, rhs)), (Some(a), Some(b)) if a == b)
    }
}

fn strip_partial(ctx: &Context, node: TypeNodeId) -> TypeNodeId {
    match ctx.arena().get(node) {
        TypeExpr::Partial { inner, .. } => strip_partial(ctx, *inner),
        _ => node,
    }
}

fn hole_id(ctx: &Context, node: TypeNodeId) -> Option<EntityId> {
    match ctx.arena().get(node) {
        TypeExpr::Hole(id) => Some(*id),
        _ => None,
    }
}

fn unwrap_foralls(ctx: &Context, mut node: TypeNodeId) -> (Vec<EntityId>, TypeNodeId) {
    let mut params = Vec::new();
    while let TypeExpr::Forall { params: these, body } = ctx.arena().get(node) {
        params.extend(these.iter().copied());
        node = *body;
    }
    (params, node)
}

fn entity_ref(ctx: &mut Context, ctx_id: ContextId, node: TypeNodeId) -> Option<EntityId> {
    match ctx.arena().get(node) {
        TypeExpr::Ref(id) => Some(*id),
        TypeExpr::Var(_) => ctx.resolve_var(ctx_id, node).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeck_ast::{Arena, Data, EntityDef, Param, ScopeNode};
    use typeck_common::{Namespace, Repository};

    fn define_data(ctx: &mut Context, name: &str, id: EntityId) {
        let root = ctx.root();
        ctx.define(
            root,
            Namespace::Type,
            name,
            EntityDef::Data(Data {
                id,
                name: name.to_string(),
                params: vec![],
                constructors: vec![],
            }),
        )
        .unwrap();
    }

    #[test]
    fn identical_refs_unify() {
        let mut arena = Arena::new();
        let int_id = EntityId::from_raw(0);
        let lhs = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let rhs = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let mut ctx = Context::empty(Repository::new(), &arena);
        define_data(&mut ctx, "Int", int_id);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
    }

    #[test]
    fn different_refs_do_not_unify() {
        let mut arena = Arena::new();
        let int_id = EntityId::from_raw(0);
        let bool_id = EntityId::from_raw(1);
        let lhs = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let rhs = arena.alloc(TypeExpr::Ref(bool_id), ScopeNode::Root);
        let mut ctx = Context::empty(Repository::new(), &arena);
        define_data(&mut ctx, "Int", int_id);
        define_data(&mut ctx, "Bool", bool_id);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(!unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
    }

    #[test]
    fn unassigned_hole_unifies_with_a_concrete_type_by_assignment() {
        let mut arena = Arena::new();
        let int_id = EntityId::from_raw(0);
        let hole_id_ = EntityId::from_raw(1);
        let lhs = arena.alloc(TypeExpr::Hole(hole_id_), ScopeNode::Root);
        let rhs = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let mut ctx = Context::empty(Repository::new(), &arena);
        define_data(&mut ctx, "Int", int_id);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
        assert_eq!(state.hole_assignment(hole_id_), Some(rhs));
    }

    #[test]
    fn two_unassigned_holes_fail_as_bottom_vs_bottom() {
        let mut arena = Arena::new();
        let h1 = EntityId::from_raw(0);
        let h2 = EntityId::from_raw(1);
        let lhs = arena.alloc(TypeExpr::Hole(h1), ScopeNode::Root);
        let rhs = arena.alloc(TypeExpr::Hole(h2), ScopeNode::Root);
        let mut ctx = Context::empty(Repository::new(), &arena);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(!unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
    }

    #[test]
    fn same_hole_on_both_sides_succeeds() {
        let mut arena = Arena::new();
        let h = EntityId::from_raw(0);
        let lhs = arena.alloc(TypeExpr::Hole(h), ScopeNode::Root);
        let rhs = arena.alloc(TypeExpr::Hole(h), ScopeNode::Root);
        let mut ctx = Context::empty(Repository::new(), &arena);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
    }

    #[test]
    fn mismatched_tuple_arity_fails() {
        let mut arena = Arena::new();
        let int_id = EntityId::from_raw(0);
        let a = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let b = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let lhs = arena.alloc(TypeExpr::Tuple(vec![a]), ScopeNode::Root);
        let rhs = arena.alloc(TypeExpr::Tuple(vec![a, b]), ScopeNode::Root);
        let mut ctx = Context::empty(Repository::new(), &arena);
        define_data(&mut ctx, "Int", int_id);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(!unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
    }

    #[test]
    fn fun_params_unify_contravariantly_via_swap() {
        // fn(Int) -> Bool  vs  fn(Int) -> Bool: same shape, should unify.
        let mut arena = Arena::new();
        let int_id = EntityId::from_raw(0);
        let bool_id = EntityId::from_raw(1);
        let lp = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let lr = arena.alloc(TypeExpr::Ref(bool_id), ScopeNode::Root);
        let rp = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let rr = arena.alloc(TypeExpr::Ref(bool_id), ScopeNode::Root);
        let lhs = arena.alloc(
            TypeExpr::Fun {
                tparams: vec![],
                params: vec![lp],
                ret: lr,
            },
            ScopeNode::Root,
        );
        let rhs = arena.alloc(
            TypeExpr::Fun {
                tparams: vec![],
                params: vec![rp],
                ret: rr,
            },
            ScopeNode::Root,
        );
        let mut ctx = Context::empty(Repository::new(), &arena);
        define_data(&mut ctx, "Int", int_id);
        define_data(&mut ctx, "Bool", bool_id);
        let root = ctx.root();
        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(unifier.unify(&mut ctx, root, &mut state, lhs, rhs));
    }

    #[test]
    fn constrained_parameter_requires_a_registered_impl() {
        // Forall [T: Eq] . Fun(T) -> T, instantiated against a type with
        // no registered Eq impl, must fail to instantiate.
        let mut arena = Arena::new();
        let eq_trait = EntityId::from_raw(0);
        let t_param = EntityId::from_raw(1);
        let int_id = EntityId::from_raw(2);
        let t_var = arena.alloc(TypeExpr::Var("T".into()), ScopeNode::Root);
        let fun = arena.alloc(
            TypeExpr::Fun {
                tparams: vec![],
                params: vec![t_var],
                ret: t_var,
            },
            ScopeNode::Root,
        );
        let forall = arena.alloc(
            TypeExpr::Forall {
                params: vec![t_param],
                body: fun,
            },
            ScopeNode::Root,
        );
        let other_t_var = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
        let concrete_fun = arena.alloc(
            TypeExpr::Fun {
                tparams: vec![],
                params: vec![other_t_var],
                ret: other_t_var,
            },
            ScopeNode::Root,
        );

        let mut ctx = Context::empty(Repository::new(), &arena);
        define_data(&mut ctx, "Int", int_id);
        let root = ctx.root();
        ctx.define(
            root,
            Namespace::Type,
            "T",
            EntityDef::Param(Param {
                id: t_param,
                name: "T".into(),
                kind: None,
                constraints: vec![Constraint {
                    trait_id: eq_trait,
                    args: vec![],
                }],
            }),
        )
        .unwrap();

        let impls = TraitImplIndex::new();
        let unifier = Unifier::new(&impls);
        let mut state = UnifyState::new();
        assert!(!unifier.unify(&mut ctx, root, &mut state, forall, concrete_fun));
    }
}
