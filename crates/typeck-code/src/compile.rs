//! The canonical encoder (spec §4.1).

use typeck_ast::{Arena, EntityDef, Entities, Kind, TypeExpr, TypeNodeId};
use typeck_common::{CheckError, EntityId};

use crate::code::{narrow_id, Word};
use crate::op::Op;

/// Everything `compile` needs from the scope tree that isn't reachable
/// from the arena alone: resolving a `Var` occurrence to the entity it
/// binds, and naming the synthetic tuple-arity constructor a `Tuple`
/// compiles against (spec §9 Open Question #1). `typeck-scope::Context`
/// is the real implementation; tests use a bare closure-backed stub.
pub trait VarResolver {
    /// Resolve a `Var` node (by its own arena id, since the name alone
    /// is not enough to disambiguate shadowing) to its defining entity.
    fn resolve_var(&mut self, node: TypeNodeId) -> Result<EntityId, CheckError>;

    /// The id of the synthetic, arity-keyed tuple constructor entity,
    /// allocated lazily on first use of a given arity.
    fn tuple_entity(&mut self, arity: usize) -> Result<EntityId, CheckError>;
}

/// Compile the type expression rooted at `id` into its canonical
/// instruction sequence.
///
/// `initial_scope` is the flattened, outermost-to-innermost list of
/// parameter ids already bound by enclosing non-`Forall` quantifier
/// scopes (a `Data`, `Alias`, or `Trait`'s own parameter list) —
/// `Context::normalize` computes it by walking the node's ancestor
/// chain before calling in here, since those scopes are anchored to
/// entities rather than arena nodes and so are invisible to a bare
/// tree walk starting at `id`.
pub fn compile(
    arena: &Arena,
    entities: &Entities,
    id: TypeNodeId,
    initial_scope: &[EntityId],
    resolver: &mut dyn VarResolver,
) -> Result<Vec<Word>, CheckError> {
    let mut compiler = Compiler {
        arena,
        entities,
        resolver,
        binders: initial_scope.to_vec(),
    };
    let mut out = Vec::new();
    compiler.expr(&mut out, id)?;
    Ok(out)
}

struct Compiler<'a> {
    arena: &'a Arena,
    entities: &'a Entities,
    resolver: &'a mut dyn VarResolver,
    /// Flat binder stack: one entry per bound parameter, outermost
    /// first. A multi-parameter `Forall`/`Fun::tparams` pushes one
    /// entry per parameter, innermost last, matching "variables bound
    /// in the same quantifier block share a De Bruijn frame; innermost
    /// binder has the smaller delta" read as per-binder telescoping.
    binders: Vec<EntityId>,
}

fn narrow_usize(value: usize) -> Result<Word, CheckError> {
    Word::try_from(value).map_err(|_| CheckError::Overflow {
        value: value as u64,
    })
}

impl<'a> Compiler<'a> {
    fn expr(&mut self, out: &mut Vec<Word>, id: TypeNodeId) -> Result<(), CheckError> {
        match self.arena.get(id).clone() {
            TypeExpr::Hole(hole_id) => {
                out.push(Op::Hole.word());
                out.push(narrow_id(hole_id)?);
            }
            // Transparent: a Partial's shape for canonical-equality
            // purposes is its inner expression. The hole-assignment
            // list is bookkeeping for the checker, not part of the
            // type's structure.
            TypeExpr::Partial { inner, .. } => self.expr(out, inner)?,
            TypeExpr::Forall { params, body } => self.forall(out, &params, body)?,
            TypeExpr::Apply { head, args } => self.apply(out, head, &args)?,
            TypeExpr::Tuple(elems) => self.tuple(out, &elems)?,
            TypeExpr::Fun {
                tparams,
                params,
                ret,
            } => self.fun(out, &tparams, &params, ret)?,
            TypeExpr::Ref(entity_id) => {
                out.push(Op::Ref.word());
                out.push(narrow_id(entity_id)?);
            }
            TypeExpr::Var(_) => {
                let target = self.resolver.resolve_var(id)?;
                let delta = self.depth_of(target)?;
                out.push(Op::Var.word());
                out.push(narrow_usize(delta)?);
            }
        }
        Ok(())
    }

    fn depth_of(&self, target: EntityId) -> Result<usize, CheckError> {
        let pos = self
            .binders
            .iter()
            .rposition(|&bound| bound == target)
            .ok_or(CheckError::InvariantViolated {
                message: format!(
                    "Var resolves to entity#{} which is not in scope at compile time",
                    target.raw()
                ),
            })?;
        Ok(self.binders.len() - 1 - pos)
    }

    /// Emit `params.len()` nested `Forall` instructions — curried, one
    /// parameter per instruction, exactly like `Fun`/`Apply` — each with
    /// its own descriptor, followed by `body` as the innermost `<expr>`.
    fn forall(
        &mut self,
        out: &mut Vec<Word>,
        params: &[EntityId],
        body: TypeNodeId,
    ) -> Result<(), CheckError> {
        if params.is_empty() {
            return self.expr(out, body);
        }
        for &param_id in params {
            out.push(Op::Forall.word());
            self.binders.push(param_id);
            self.param_descriptor(out, param_id)?;
        }
        self.expr(out, body)?;
        self.binders.truncate(self.binders.len() - params.len());
        Ok(())
    }

    fn param_descriptor(&mut self, out: &mut Vec<Word>, param_id: EntityId) -> Result<(), CheckError> {
        let param = match self.entities.get(param_id) {
            Some(EntityDef::Param(p)) => Some(p),
            _ => None,
        };
        let Some(param) = param else {
            return Ok(());
        };
        if let Some(kind) = param.kind.clone() {
            self.kind_expr(out, &kind);
            return Ok(());
        }
        if !param.constraints.is_empty() {
            let mut encoded: Vec<Vec<Word>> = Vec::with_capacity(param.constraints.len());
            for constraint in &param.constraints {
                let mut sub = Vec::new();
                sub.push(Op::Ref.word());
                sub.push(narrow_id(constraint.trait_id)?);
                for &arg in &constraint.args {
                    self.expr(&mut sub, arg)?;
                }
                encoded.push(sub);
            }
            encoded.sort();
            for sub in encoded {
                out.push(Op::Impl.word());
                out.extend(sub);
            }
        }
        Ok(())
    }

    fn kind_expr(&self, out: &mut Vec<Word>, kind: &Kind) {
        out.extend(crate::kind::encode_kind(kind));
    }

    fn apply(
        &mut self,
        out: &mut Vec<Word>,
        head: TypeNodeId,
        args: &[TypeNodeId],
    ) -> Result<(), CheckError> {
        for _ in args {
            out.push(Op::Apply.word());
        }
        self.expr(out, head)?;
        for &arg in args {
            self.expr(out, arg)?;
        }
        Ok(())
    }

    fn tuple(&mut self, out: &mut Vec<Word>, elems: &[TypeNodeId]) -> Result<(), CheckError> {
        let tuple_entity = self.resolver.tuple_entity(elems.len())?;
        for _ in elems {
            out.push(Op::Apply.word());
        }
        out.push(Op::Ref.word());
        out.push(narrow_id(tuple_entity)?);
        for &elem in elems {
            self.expr(out, elem)?;
        }
        Ok(())
    }

    /// `Fun`'s own generic parameters are not part of the canonical
    /// alphabet's `Fun` grammar; they compile as an implicit wrapping
    /// `Forall`, one opcode per parameter, around the curried `Fun`
    /// instructions — the same closed-alphabet treatment the spec
    /// mandates for tuples.
    fn fun(
        &mut self,
        out: &mut Vec<Word>,
        tparams: &[EntityId],
        params: &[TypeNodeId],
        ret: TypeNodeId,
    ) -> Result<(), CheckError> {
        if !tparams.is_empty() {
            for &param_id in tparams {
                out.push(Op::Forall.word());
                self.binders.push(param_id);
                self.param_descriptor(out, param_id)?;
            }
        }
        for _ in params {
            out.push(Op::Fun.word());
        }
        for &param in params {
            self.expr(out, param)?;
        }
        self.expr(out, ret)?;
        if !tparams.is_empty() {
            self.binders.truncate(self.binders.len() - tparams.len());
        }
        Ok(())
    }
}
