//! Universal properties (spec §8) that hold across every well-formed
//! input rather than one scenario: reflexivity, hole idempotence, and
//! symmetry modulo the contravariant swap in function parameter
//! position.

use typeck::{
    Arena, Context, Data, EntityDef, EntityId, Namespace, Repository, ScopeNode, TraitImplIndex,
    TypeExpr, UnifyState, Unifier,
};

fn define_int(ctx: &mut Context, id: EntityId) {
    let root = ctx.root();
    ctx.define(
        root,
        Namespace::Type,
        "Int",
        EntityDef::Data(Data {
            id,
            name: "Int".into(),
            params: vec![],
            constructors: vec![],
        }),
    )
    .unwrap();
}

#[test]
fn a_ref_unifies_with_itself() {
    let mut arena = Arena::new();
    let int_id = EntityId::from_raw(0);
    let node = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
    let mut ctx = Context::empty(Repository::new(), &arena);
    define_int(&mut ctx, int_id);
    let root = ctx.root();
    let impls = TraitImplIndex::new();
    let unifier = Unifier::new(&impls);
    let mut state = UnifyState::new();

    assert!(unifier.unify(&mut ctx, root, &mut state, node, node));
}

#[test]
fn a_tuple_of_refs_unifies_with_itself() {
    let mut arena = Arena::new();
    let int_id = EntityId::from_raw(0);
    let bool_id = EntityId::from_raw(1);
    let int_ref = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
    let bool_ref = arena.alloc(TypeExpr::Ref(bool_id), ScopeNode::Root);
    let tuple = arena.alloc(TypeExpr::Tuple(vec![int_ref, bool_ref]), ScopeNode::Root);
    let mut ctx = Context::empty(Repository::new(), &arena);
    define_int(&mut ctx, int_id);
    ctx.define(
        ctx.root(),
        Namespace::Type,
        "Bool",
        EntityDef::Data(Data {
            id: bool_id,
            name: "Bool".into(),
            params: vec![],
            constructors: vec![],
        }),
    )
    .unwrap();
    let root = ctx.root();
    let impls = TraitImplIndex::new();
    let unifier = Unifier::new(&impls);
    let mut state = UnifyState::new();

    assert!(unifier.unify(&mut ctx, root, &mut state, tuple, tuple));
}

#[test]
fn assigning_a_hole_twice_to_the_same_type_is_idempotent() {
    let mut arena = Arena::new();
    let int_id = EntityId::from_raw(0);
    let hole_id = EntityId::from_raw(1);
    let int_ref = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
    let hole = arena.alloc(TypeExpr::Hole(hole_id), ScopeNode::Root);
    let mut ctx = Context::empty(Repository::new(), &arena);
    define_int(&mut ctx, int_id);
    let root = ctx.root();
    let impls = TraitImplIndex::new();
    let unifier = Unifier::new(&impls);
    let mut state = UnifyState::new();

    assert!(unifier.unify(&mut ctx, root, &mut state, hole, int_ref));
    assert_eq!(state.hole_assignment(hole_id), Some(int_ref));
    // Unifying the now-assigned hole against the same type again must
    // still succeed and must not change the recorded assignment.
    assert!(unifier.unify(&mut ctx, root, &mut state, hole, int_ref));
    assert_eq!(state.hole_assignment(hole_id), Some(int_ref));
}

#[test]
fn an_assigned_hole_rejects_a_conflicting_type() {
    let mut arena = Arena::new();
    let int_id = EntityId::from_raw(0);
    let bool_id = EntityId::from_raw(1);
    let hole_id = EntityId::from_raw(2);
    let int_ref = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
    let bool_ref = arena.alloc(TypeExpr::Ref(bool_id), ScopeNode::Root);
    let hole = arena.alloc(TypeExpr::Hole(hole_id), ScopeNode::Root);
    let mut ctx = Context::empty(Repository::new(), &arena);
    define_int(&mut ctx, int_id);
    ctx.define(
        ctx.root(),
        Namespace::Type,
        "Bool",
        EntityDef::Data(Data {
            id: bool_id,
            name: "Bool".into(),
            params: vec![],
            constructors: vec![],
        }),
    )
    .unwrap();
    let root = ctx.root();
    let impls = TraitImplIndex::new();
    let unifier = Unifier::new(&impls);
    let mut state = UnifyState::new();

    assert!(unifier.unify(&mut ctx, root, &mut state, hole, int_ref));
    assert!(!unifier.unify(&mut ctx, root, &mut state, hole, bool_ref));
}

#[test]
fn non_function_unification_is_symmetric() {
    let mut arena = Arena::new();
    let int_id = EntityId::from_raw(0);
    let lhs = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
    let rhs = arena.alloc(TypeExpr::Ref(int_id), ScopeNode::Root);
    let mut ctx = Context::empty(Repository::new(), &arena);
    define_int(&mut ctx, int_id);
    let root = ctx.root();
    let impls = TraitImplIndex::new();
    let unifier = Unifier::new(&impls);

    let mut forward = UnifyState::new();
    let mut backward = UnifyState::new();
    assert_eq!(
        unifier.unify(&mut ctx, root, &mut forward, lhs, rhs),
        unifier.unify(&mut ctx, root, &mut backward, rhs, lhs),
    );
}
