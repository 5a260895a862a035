//! The LL decoder and the standalone tree it produces (spec §4.1).
//!
//! `decode` cannot reconstruct the original AST — entity names, parent
//! pointers and arena identity are gone once a type has been compiled —
//! so it returns `DecodedType`, a tree over the raw numeric operands,
//! good enough for round-trip assertions (`decode ∘ encode = id` up to
//! α-equivalence) and for the disassembler.

use typeck_common::CheckError;

use crate::code::{TypeCode, Word};
use crate::op::Op;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedType {
    Hole(u32),
    Forall {
        descriptor: ForallDescriptor,
        body: Box<DecodedType>,
    },
    Apply {
        head: Box<DecodedType>,
        args: Vec<DecodedType>,
    },
    Fun {
        params: Vec<DecodedType>,
        ret: Box<DecodedType>,
    },
    Ref(u32),
    Var(u16),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForallDescriptor {
    None,
    Kind(DecodedKind),
    Constraints(Vec<DecodedType>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedKind {
    Concrete,
    Arrow(Box<DecodedKind>, Box<DecodedKind>),
}

/// Decode one type expression starting at `offset` words into `code`,
/// returning the tree and the offset immediately after it.
pub fn decode(code: &TypeCode, offset: usize) -> Result<(DecodedType, usize), CheckError> {
    decode_expr(code.words(), offset)
}

fn peek_op(words: &[Word], offset: usize) -> Result<Option<Op>, CheckError> {
    match words.get(offset) {
        Some(&w) => Op::from_word(w).map(Some),
        None => Ok(None),
    }
}

fn take_word(words: &[Word], offset: usize) -> Result<(Word, usize), CheckError> {
    words
        .get(offset)
        .copied()
        .map(|w| (w, offset + 1))
        .ok_or(CheckError::UnexpectedEnd)
}

fn decode_expr(words: &[Word], offset: usize) -> Result<(DecodedType, usize), CheckError> {
    let (op_word, mut offset) = take_word(words, offset)?;
    match Op::from_word(op_word)? {
        Op::Hole => {
            let (id, next) = take_word(words, offset)?;
            Ok((DecodedType::Hole(u32::from(id)), next))
        }
        Op::Ref => {
            let (id, next) = take_word(words, offset)?;
            Ok((DecodedType::Ref(u32::from(id)), next))
        }
        Op::Var => {
            let (delta, next) = take_word(words, offset)?;
            Ok((DecodedType::Var(delta), next))
        }
        Op::Forall => {
            let descriptor;
            (descriptor, offset) = decode_forall_descriptor(words, offset)?;
            let (body, next) = decode_expr(words, offset)?;
            Ok((
                DecodedType::Forall {
                    descriptor,
                    body: Box::new(body),
                },
                next,
            ))
        }
        Op::Apply => {
            let mut arity = 1;
            while peek_op(words, offset)? == Some(Op::Apply) {
                arity += 1;
                offset += 1;
            }
            let (head, mut offset) = decode_expr(words, offset)?;
            let mut args = Vec::with_capacity(arity);
            for _ in 0..arity {
                let (arg, next) = decode_expr(words, offset)?;
                args.push(arg);
                offset = next;
            }
            Ok((
                DecodedType::Apply {
                    head: Box::new(head),
                    args,
                },
                offset,
            ))
        }
        Op::Fun => {
            let mut arity = 1;
            while peek_op(words, offset)? == Some(Op::Fun) {
                arity += 1;
                offset += 1;
            }
            let mut params = Vec::with_capacity(arity);
            let mut cursor = offset;
            for _ in 0..arity {
                let (param, next) = decode_expr(words, cursor)?;
                params.push(param);
                cursor = next;
            }
            let (ret, next) = decode_expr(words, cursor)?;
            Ok((
                DecodedType::Fun {
                    params,
                    ret: Box::new(ret),
                },
                next,
            ))
        }
        Op::Concrete | Op::Hkt | Op::Impl => Err(CheckError::InvalidOp { opcode: op_word }),
    }
}

/// The word right after a `Forall` opcode disambiguates the descriptor:
/// `Concrete`/`Hkt` start a kind, `Impl` starts a constraint run,
/// anything else means "no descriptor, this is already the body".
fn decode_forall_descriptor(
    words: &[Word],
    offset: usize,
) -> Result<(ForallDescriptor, usize), CheckError> {
    match peek_op(words, offset)? {
        Some(Op::Concrete) | Some(Op::Hkt) => {
            let (kind, next) = decode_kind(words, offset)?;
            Ok((ForallDescriptor::Kind(kind), next))
        }
        Some(Op::Impl) => {
            let mut constraints = Vec::new();
            let mut cursor = offset;
            while peek_op(words, cursor)? == Some(Op::Impl) {
                cursor += 1;
                let (term, next) = decode_expr(words, cursor)?;
                constraints.push(term);
                cursor = next;
            }
            Ok((ForallDescriptor::Constraints(constraints), cursor))
        }
        _ => Ok((ForallDescriptor::None, offset)),
    }
}

fn decode_kind(words: &[Word], offset: usize) -> Result<(DecodedKind, usize), CheckError> {
    let (op_word, offset) = take_word(words, offset)?;
    match Op::from_word(op_word)? {
        Op::Concrete => Ok((DecodedKind::Concrete, offset)),
        Op::Hkt => {
            let (from, offset) = decode_kind(words, offset)?;
            let (to, offset) = decode_kind(words, offset)?;
            Ok((DecodedKind::Arrow(Box::new(from), Box::new(to)), offset))
        }
        _ => Err(CheckError::InvalidOp { opcode: op_word }),
    }
}
