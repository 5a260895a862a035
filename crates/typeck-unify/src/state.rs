//! Unifier mutable state (spec §9 "Unifier mutable state").
//!
//! Carries the two sides' unwrapped-`Forall`/`Fun` parameter stacks, a
//! per-parameter capture list, and the hole-assignment map. `swap()`
//! exchanges the two parameter stacks for contravariant recursion into
//! function parameters (spec §4.4.2 rule 8); callers that want
//! speculative unification clone the whole state first and restore it on
//! failure (spec §4.4.4 — unification is not transactional on its own).

use rustc_hash::FxHashMap;

use typeck_ast::{Kind, TypeNodeId};
use typeck_common::EntityId;

/// A mark returned by [`UnifyState::push_params`], used to pop exactly
/// the parameters a single quantifier scope pushed once that scope's
/// body has been fully unified.
#[derive(Clone, Copy, Debug)]
pub struct ParamMark(usize, usize);

#[derive(Clone, Debug, Default)]
pub struct UnifyState {
    lhs_params: Vec<EntityId>,
    rhs_params: Vec<EntityId>,
    captures: FxHashMap<EntityId, Vec<TypeNodeId>>,
    holes: FxHashMap<EntityId, (TypeNodeId, Kind)>,
}

impl UnifyState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchange the lhs/rhs parameter stacks in place.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.lhs_params, &mut self.rhs_params);
    }

    /// Push a freshly unwrapped quantifier's parameters onto both
    /// stacks, returning a mark to [`truncate_params`](Self::truncate_params)
    /// back to once its scope is exited.
    pub fn push_params(&mut self, lhs: &[EntityId], rhs: &[EntityId]) -> ParamMark {
        let mark = ParamMark(self.lhs_params.len(), self.rhs_params.len());
        self.lhs_params.extend_from_slice(lhs);
        self.rhs_params.extend_from_slice(rhs);
        mark
    }

    pub fn truncate_params(&mut self, mark: ParamMark) {
        self.lhs_params.truncate(mark.0);
        self.rhs_params.truncate(mark.1);
    }

    #[must_use]
    pub fn is_lhs_param(&self, id: EntityId) -> bool {
        self.lhs_params.contains(&id)
    }

    #[must_use]
    pub fn is_rhs_param(&self, id: EntityId) -> bool {
        self.rhs_params.contains(&id)
    }

    /// Record `ty` as a new captured instance of `param`, returning every
    /// instance captured for it before this call so the caller can unify
    /// the new instance against each of them in turn (spec §4.4.2 rule 1:
    /// "unify rhs with every previously captured instance of that
    /// parameter").
    pub fn capture(&mut self, param: EntityId, ty: TypeNodeId) -> Vec<TypeNodeId> {
        let list = self.captures.entry(param).or_default();
        let prior = list.clone();
        list.push(ty);
        prior
    }

    /// Every instance captured for `param` so far, outermost-first. A
    /// read-only counterpart to [`capture`](Self::capture) for callers
    /// that want to inspect the recorded environment afterward (spec
    /// §4.4: "a recorded environment that a caller can read to discover
    /// ... captured parameter instantiations").
    #[must_use]
    pub fn captures_of(&self, param: EntityId) -> &[TypeNodeId] {
        self.captures.get(&param).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn hole_assignment(&self, hole: EntityId) -> Option<TypeNodeId> {
        self.holes.get(&hole).map(|(ty, _)| *ty)
    }

    #[must_use]
    pub fn hole_kind(&self, hole: EntityId) -> Option<Kind> {
        self.holes.get(&hole).map(|(_, k)| k.clone())
    }

    pub fn assign_hole(&mut self, hole: EntityId, ty: TypeNodeId, kind: Kind) {
        self.holes.insert(hole, (ty, kind));
    }
}
