//! Standalone encoding of a [`Kind`] value, reusing the `Concrete`/`Hkt`
//! opcodes that a `Forall`'s HKT-parameter descriptor embeds (spec
//! §4.1). Exposed so `typeck-unify`'s constraint-discharge step can
//! compare "canonical codes" the way spec §4.3 literally asks for,
//! rather than falling back to `Kind`'s derived structural equality.

use typeck_ast::Kind;

use crate::code::Word;
use crate::op::Op;

#[must_use]
pub fn encode_kind(kind: &Kind) -> Vec<Word> {
    let mut out = Vec::new();
    encode_kind_into(&mut out, kind);
    out
}

fn encode_kind_into(out: &mut Vec<Word>, kind: &Kind) {
    match kind {
        Kind::Concrete => out.push(Op::Concrete.word()),
        Kind::Arrow(from, to) => {
            out.push(Op::Hkt.word());
            encode_kind_into(out, from);
            encode_kind_into(out, to);
        }
    }
}
