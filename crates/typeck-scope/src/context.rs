//! `Context`: an arena of lexical scopes plus the entity table they share.
//!
//! Scopes are addressed by `ContextId`, never by a borrowed reference or
//! `Rc` — the same arena-of-ids discipline `typeck-ast::Arena` uses for
//! type nodes, applied here to avoid a literal parent pointer forming a
//! reference cycle between a `Context` and its children.

use rustc_hash::FxHashMap;
use tracing::{span, Level};

use typeck_ast::{Arena, EntityDef, Entities, ScopeNode, TypeExpr, TypeNodeId};
use typeck_code::{compile, decode, DecodedType, TypeCode, VarResolver};
use typeck_common::{CheckError, CheckerConfig, EntityId, Namespace, Repository};

/// A handle into the scope arena. Stable for the session's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u32);

impl ContextId {
    const ROOT: ContextId = ContextId(0);
}

struct ScopeData {
    parent: Option<ContextId>,
    scope: ScopeNode,
    depth: usize,
    defined_here: FxHashMap<EntityId, ()>,
    by_value_name: FxHashMap<String, EntityId>,
    by_type_name: FxHashMap<String, EntityId>,
    var_cache: FxHashMap<TypeNodeId, EntityId>,
    normalize_cache: FxHashMap<TypeNodeId, TypeCode>,
}

impl ScopeData {
    fn empty() -> Self {
        Self {
            parent: None,
            scope: ScopeNode::Root,
            depth: 0,
            defined_here: FxHashMap::default(),
            by_value_name: FxHashMap::default(),
            by_type_name: FxHashMap::default(),
            var_cache: FxHashMap::default(),
            normalize_cache: FxHashMap::default(),
        }
    }
}

/// The scope tree for one checking session.
///
/// Owns the [`Repository`] (needed to mint ids for synthetic tuple
/// constructors, spec.md §9 Open Question #1) and the [`Entities`] table
/// (populated by repeated `define` calls, per the documented
/// `Undefined -> Defined` state machine); borrows the [`Arena`], which is
/// fully built by the external parser before a `Context` is ever
/// constructed.
pub struct Context<'a> {
    arena: &'a Arena,
    repo: Repository,
    entities: Entities,
    scopes: Vec<ScopeData>,
    by_scope_node: FxHashMap<ScopeNode, ContextId>,
    tuple_entities: FxHashMap<usize, EntityId>,
    config: CheckerConfig,
}

impl<'a> Context<'a> {
    /// Construct the root context with the given options. `repo` must
    /// already have minted every id the incoming AST uses; this `Context`
    /// continues allocating from it for entities it synthesizes itself
    /// (tuple constructors).
    #[must_use]
    pub fn with_config(repo: Repository, arena: &'a Arena, config: CheckerConfig) -> Self {
        let mut by_scope_node = FxHashMap::default();
        by_scope_node.insert(ScopeNode::Root, ContextId::ROOT);
        Self {
            arena,
            repo,
            entities: Entities::new(),
            scopes: vec![ScopeData::empty()],
            by_scope_node,
            tuple_entities: FxHashMap::default(),
            config,
        }
    }

    /// Construct the root context with default options.
    #[must_use]
    pub fn empty(repo: Repository, arena: &'a Arena) -> Self {
        Self::with_config(repo, arena, CheckerConfig::default())
    }

    #[must_use]
    pub const fn root(&self) -> ContextId {
        ContextId::ROOT
    }

    #[must_use]
    pub const fn config(&self) -> &CheckerConfig {
        &self.config
    }

    #[must_use]
    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    #[must_use]
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    #[must_use]
    pub fn depth(&self, ctx: ContextId) -> usize {
        self.scopes[ctx.0 as usize].depth
    }

    #[must_use]
    pub fn scope_node(&self, ctx: ContextId) -> ScopeNode {
        self.scopes[ctx.0 as usize].scope
    }

    #[must_use]
    pub fn parent(&self, ctx: ContextId) -> Option<ContextId> {
        self.scopes[ctx.0 as usize].parent
    }

    /// Insert `entity` into this scope's id map and the appropriate name
    /// map (value or type, per [`Namespace`]). Fails with `Redeclaration`
    /// when the name already exists in *this* scope — sibling scopes, and
    /// ancestor scopes, may shadow freely.
    pub fn define(
        &mut self,
        ctx: ContextId,
        namespace: Namespace,
        name: &str,
        def: EntityDef,
    ) -> Result<(), CheckError> {
        let id = def.id();
        let scope = &mut self.scopes[ctx.0 as usize];
        let name_map = match namespace {
            Namespace::Value => &mut scope.by_value_name,
            Namespace::Type => &mut scope.by_type_name,
        };
        if name_map.contains_key(name) {
            return Err(CheckError::Redeclaration {
                name: name.to_string(),
                namespace,
            });
        }
        name_map.insert(name.to_string(), id);
        scope.defined_here.insert(id, ());
        self.entities.insert(def);
        Ok(())
    }

    /// Return the unique child context for `scope`, creating it (as a
    /// child of `parent`) on first call. Quantifier scopes increment
    /// depth; block-like scopes (`Partial`) inherit it unchanged, per
    /// [`ScopeNode::introduces_type_params`].
    pub fn enter(&mut self, parent: ContextId, scope: ScopeNode) -> ContextId {
        if let Some(&existing) = self.by_scope_node.get(&scope) {
            return existing;
        }
        let parent_depth = self.scopes[parent.0 as usize].depth;
        let depth = if scope.introduces_type_params() {
            parent_depth + 1
        } else {
            parent_depth
        };
        let mut data = ScopeData::empty();
        data.parent = Some(parent);
        data.scope = scope;
        data.depth = depth;
        let id = ContextId(self.scopes.len() as u32);
        self.scopes.push(data);
        self.by_scope_node.insert(scope, id);
        id
    }

    /// Define the parameters of a quantifier scope (`Forall`, or a
    /// `Data`/`Alias`/`Trait`'s own parameter list) as entities local to
    /// that scope, as `enter`'s documentation promises
    /// ("pre-populate parameters as entities").
    pub fn define_params(
        &mut self,
        ctx: ContextId,
        params: impl IntoIterator<Item = typeck_ast::Param>,
    ) -> Result<(), CheckError> {
        for param in params {
            let name = param.name.clone();
            self.define(ctx, Namespace::Type, &name, EntityDef::Param(param))?;
        }
        Ok(())
    }

    /// Walk the parent chain starting at `ctx` looking for `id` among
    /// each scope's directly-defined entities. Returns the defining
    /// scope, not `ctx` itself unless it was defined there.
    #[must_use]
    pub fn resolve_id(&self, ctx: ContextId, id: EntityId) -> Option<ContextId> {
        let mut cursor = Some(ctx);
        while let Some(current) = cursor {
            let scope = &self.scopes[current.0 as usize];
            if scope.defined_here.contains_key(&id) {
                return Some(current);
            }
            cursor = scope.parent;
        }
        None
    }

    #[must_use]
    pub fn resolve_value_name(&self, ctx: ContextId, name: &str) -> Option<(ContextId, EntityId)> {
        self.resolve_name(ctx, name, Namespace::Value)
    }

    #[must_use]
    pub fn resolve_type_name(&self, ctx: ContextId, name: &str) -> Option<(ContextId, EntityId)> {
        self.resolve_name(ctx, name, Namespace::Type)
    }

    fn resolve_name(
        &self,
        ctx: ContextId,
        name: &str,
        namespace: Namespace,
    ) -> Option<(ContextId, EntityId)> {
        let mut cursor = Some(ctx);
        while let Some(current) = cursor {
            let scope = &self.scopes[current.0 as usize];
            let map = match namespace {
                Namespace::Value => &scope.by_value_name,
                Namespace::Type => &scope.by_type_name,
            };
            if let Some(&id) = map.get(name) {
                return Some((current, id));
            }
            cursor = scope.parent;
        }
        None
    }

    /// The context of the nearest enclosing scope for an arena node.
    #[must_use]
    pub fn find_context(&self, node: TypeNodeId) -> ContextId {
        let scope = self.arena.enclosing_scope(node);
        self.by_scope_node
            .get(&scope)
            .copied()
            .unwrap_or(ContextId::ROOT)
    }

    /// Cache-assisted resolution of a `Var` occurrence to the entity it
    /// binds. `node` must address a `TypeExpr::Var` in the arena.
    pub fn resolve_var(&mut self, _ctx: ContextId, node: TypeNodeId) -> Result<EntityId, CheckError> {
        self.field_resolver().resolve_var(node)
    }

    /// Reserve (or reuse) the synthetic top-level entity id a `Tuple` of
    /// this arity compiles against.
    pub fn tuple_entity(&mut self, arity: usize) -> EntityId {
        self.field_resolver()
            .tuple_entity(arity)
            .expect("Repository::alloc never fails until 2^32 ids are exhausted")
    }

    fn field_resolver(&mut self) -> FieldResolver<'a, '_> {
        FieldResolver {
            arena: self.arena,
            repo: &mut self.repo,
            scopes: &mut self.scopes,
            by_scope_node: &self.by_scope_node,
            tuple_entities: &mut self.tuple_entities,
        }
    }

    /// Encode `node`'s type to its canonical code, memoized per node.
    pub fn normalize(&mut self, ctx: ContextId, node: TypeNodeId) -> Result<TypeCode, CheckError> {
        let _span = span!(Level::TRACE, "normalize", node = node.raw()).entered();
        let home = self.find_context(node);
        if let Some(code) = self.scopes[home.0 as usize].normalize_cache.get(&node) {
            return Ok(code.clone());
        }
        let initial_scope = self.ancestor_params(ctx);
        let arena = self.arena;
        // `entities` is borrowed immutably while `resolver` borrows the
        // remaining fields mutably; both are direct field projections of
        // `self` so the borrow checker tracks them as disjoint without
        // needing a method call (and without `unsafe`) to split them.
        let words = {
            let mut resolver = FieldResolver {
                arena,
                repo: &mut self.repo,
                scopes: &mut self.scopes,
                by_scope_node: &self.by_scope_node,
                tuple_entities: &mut self.tuple_entities,
            };
            compile(arena, &self.entities, node, &initial_scope, &mut resolver)?
        };
        let code = TypeCode::encode(words);
        self.scopes[home.0 as usize]
            .normalize_cache
            .insert(node, code.clone());
        Ok(code)
    }

    /// Decode a previously compiled code back into a standalone tree —
    /// exposed for round-trip tests and the disassembler; `Context` adds
    /// nothing decode doesn't already provide, it just keeps the public
    /// facade in one place.
    pub fn decode(&self, code: &TypeCode) -> Result<DecodedType, CheckError> {
        let (tree, _) = decode(code, 0)?;
        Ok(tree)
    }

    /// Flatten the parameter lists of every ancestor scope that is
    /// anchored to an entity rather than an arena node (`Data`/`Alias`/
    /// `Trait` params) into one outermost-to-innermost list — the seed
    /// `compile` needs since those scopes are invisible to a tree walk
    /// starting from a bare `TypeNodeId` (see `compile`'s doc comment).
    fn ancestor_params(&self, ctx: ContextId) -> Vec<EntityId> {
        let mut chain = Vec::new();
        let mut cursor = Some(ctx);
        while let Some(current) = cursor {
            let scope = &self.scopes[current.0 as usize];
            if let ScopeNode::AliasParams(owner)
            | ScopeNode::DataParams(owner)
            | ScopeNode::TraitParams(owner) = scope.scope
            {
                if let Some(EntityDef::Alias(a)) = self.entities.get(owner) {
                    chain.push(a.params.clone());
                } else if let Some(EntityDef::Data(d)) = self.entities.get(owner) {
                    chain.push(d.params.clone());
                } else if let Some(EntityDef::Trait(t)) = self.entities.get(owner) {
                    chain.push(t.params.clone());
                }
            }
            cursor = scope.parent;
        }
        chain.reverse();
        chain.into_iter().flatten().collect()
    }
}

/// Adapts a handful of `Context`'s fields to `typeck-code`'s
/// `VarResolver` for the duration of one `compile` call, borrowed
/// directly (rather than through `&mut Context`) so the caller can keep
/// an independent immutable borrow of `entities` alive at the same time.
struct FieldResolver<'a, 'b> {
    arena: &'a Arena,
    repo: &'b mut Repository,
    scopes: &'b mut Vec<ScopeData>,
    by_scope_node: &'b FxHashMap<ScopeNode, ContextId>,
    tuple_entities: &'b mut FxHashMap<usize, EntityId>,
}

impl FieldResolver<'_, '_> {
    fn find_context(&self, node: TypeNodeId) -> ContextId {
        let scope = self.arena.enclosing_scope(node);
        self.by_scope_node
            .get(&scope)
            .copied()
            .unwrap_or(ContextId::ROOT)
    }
}

impl VarResolver for FieldResolver<'_, '_> {
    fn resolve_var(&mut self, node: TypeNodeId) -> Result<EntityId, CheckError> {
        let home = self.find_context(node);
        if let Some(&cached) = self.scopes[home.0 as usize].var_cache.get(&node) {
            return Ok(cached);
        }
        let name = match self.arena.get(node) {
            TypeExpr::Var(name) => name.clone(),
            other => {
                return Err(CheckError::InvariantViolated {
                    message: format!("resolve_var called on non-Var node {other:?}"),
                })
            }
        };
        let mut cursor = Some(home);
        let found = loop {
            let Some(current) = cursor else {
                break None;
            };
            let scope = &self.scopes[current.0 as usize];
            if let Some(&id) = scope.by_type_name.get(&name) {
                break Some(id);
            }
            cursor = scope.parent;
        };
        let id = found.ok_or_else(|| CheckError::NotFound { name: name.clone() })?;
        self.scopes[home.0 as usize].var_cache.insert(node, id);
        Ok(id)
    }

    fn tuple_entity(&mut self, arity: usize) -> Result<EntityId, CheckError> {
        if let Some(&id) = self.tuple_entities.get(&arity) {
            return Ok(id);
        }
        let id = self.repo.alloc();
        self.tuple_entities.insert(arity, id);
        Ok(id)
    }
}
