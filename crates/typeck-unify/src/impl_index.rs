//! Trait-impl index: `TraitCode -> TypeCode -> Impl` (spec §4.5).

use rustc_hash::FxHashMap;

use typeck_code::{narrow_id, Op, TypeCode};
use typeck_common::{CheckError, EntityId};

/// An opaque handle to whatever a caller registers as an impl. The
/// checker core never inspects it beyond storing and returning it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Impl(pub EntityId);

/// The two-level map `defineImpl`/constraint-discharge consult.
#[derive(Debug, Default)]
pub struct TraitImplIndex {
    by_trait: FxHashMap<TypeCode, FxHashMap<TypeCode, Impl>>,
}

impl TraitImplIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an impl of `trait_code` for `type_code`. Both keys must
    /// already be canonicalized by the caller (spec §4.5: "canonicalizes
    /// both keys via TypeCode before insertion" — `Context::normalize`
    /// and [`trait_application_code`] are the two canonicalizers in this
    /// core, so this function takes codes rather than raw nodes to avoid
    /// depending on `typeck-scope` for a second time).
    pub fn define_impl(&mut self, trait_code: TypeCode, type_code: TypeCode, imp: Impl) -> Result<(), CheckError> {
        let by_type = self.by_trait.entry(trait_code.clone()).or_default();
        if by_type.contains_key(&type_code) {
            return Err(CheckError::OverlappingImpl {
                trait_name: format!("{trait_code:?}"),
                type_desc: format!("{type_code:?}"),
            });
        }
        by_type.insert(type_code, imp);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, trait_code: &TypeCode, type_code: &TypeCode) -> bool {
        self.by_trait.get(trait_code).is_some_and(|by_type| by_type.contains_key(type_code))
    }

    #[must_use]
    pub fn get(&self, trait_code: &TypeCode, type_code: &TypeCode) -> Option<Impl> {
        self.by_trait.get(trait_code)?.get(type_code).copied()
    }
}

/// The canonical code for a trait applied to its constraint arguments
/// (`T: Trait<Args>`), built the same way `compile` encodes `Apply`
/// (spec §4.1: "emit n `Apply` opcodes, then head, then each argument")
/// but spliced together from already-normalized argument codes, since a
/// constraint's trait head has no arena node of its own to walk.
pub fn trait_application_code(trait_id: EntityId, arg_codes: &[TypeCode]) -> Result<TypeCode, CheckError> {
    let mut words = Vec::with_capacity(arg_codes.len() + 2 + arg_codes.iter().map(TypeCode::len).sum::<usize>());
    for _ in arg_codes {
        words.push(Op::Apply.word());
    }
    words.push(Op::Ref.word());
    words.push(narrow_id(trait_id)?);
    for code in arg_codes {
        words.extend_from_slice(code.words());
    }
    Ok(TypeCode::encode(words))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_trait_application_matches_a_bare_ref_code() {
        let id = EntityId::from_raw(3);
        let code = trait_application_code(id, &[]).unwrap();
        let expected = TypeCode::encode([Op::Ref.word(), 3]);
        assert_eq!(code, expected);
    }

    #[test]
    fn redefining_the_same_pair_is_overlapping_impl() {
        let mut index = TraitImplIndex::new();
        let trait_code = TypeCode::encode([Op::Ref.word(), 0]);
        let type_code = TypeCode::encode([Op::Ref.word(), 1]);
        index.define_impl(trait_code.clone(), type_code.clone(), Impl(EntityId::from_raw(10))).unwrap();
        let err = index.define_impl(trait_code, type_code, Impl(EntityId::from_raw(11))).unwrap_err();
        assert!(matches!(err, CheckError::OverlappingImpl { .. }));
    }

    #[test]
    fn lookup_misses_an_unregistered_pair() {
        let index = TraitImplIndex::new();
        let trait_code = TypeCode::encode([Op::Ref.word(), 0]);
        let type_code = TypeCode::encode([Op::Ref.word(), 1]);
        assert!(!index.contains(&trait_code, &type_code));
    }
}
