//! `TypeCode`: the opaque, hashable canonical encoding.

use typeck_common::{CheckError, EntityId};

/// One 16-bit instruction word.
pub type Word = u16;

/// A canonical byte-string over the 16-bit instruction alphabet.
///
/// Two types that are structurally α-equivalent under the same scope
/// tree compile to the same `TypeCode` (spec §3.3's canonicality
/// invariant) — `Eq`/`Hash`/`Ord` on this type are therefore plain
/// derived byte-string comparisons, exactly what the trait-impl index
/// and constraint-sorting (ascending byte-string order) need.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeCode(Box<[Word]>);

impl TypeCode {
    /// Fold a finite sequence of instruction words into a canonical
    /// code. Each word must already fit in 16 bits by construction
    /// (`compile` is the only intended producer); this is a pure
    /// packing step, not a validating one.
    #[must_use]
    pub fn encode(seq: impl IntoIterator<Item = Word>) -> Self {
        Self(seq.into_iter().collect())
    }

    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Narrow a `u32` entity id into the 16-bit word an instruction operand
/// requires, raising `Overflow` past the code's address space (spec
/// §4.1: "Overflow when encoding an id ≥ 2¹⁶").
pub fn narrow_id(id: EntityId) -> Result<Word, CheckError> {
    Word::try_from(id.raw()).map_err(|_| CheckError::Overflow {
        value: u64::from(id.raw()),
    })
}
