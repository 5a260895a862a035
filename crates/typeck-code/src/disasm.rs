//! A textual disassembler over `TypeCode`, used for diagnostics and for
//! asserting readable output in tests rather than raw word vectors.

use std::fmt::Write as _;

use crate::code::TypeCode;
use crate::decode::{decode, DecodedKind, DecodedType, ForallDescriptor};
use typeck_common::CheckError;

/// Render the whole code as an s-expression-shaped string.
pub fn disassemble(code: &TypeCode) -> Result<String, CheckError> {
    let (tree, consumed) = decode(code, 0)?;
    if consumed != code.len() {
        return Err(CheckError::InvariantViolated {
            message: format!(
                "disassembly consumed {consumed} of {} words; trailing data",
                code.len()
            ),
        });
    }
    let mut out = String::new();
    write_type(&mut out, &tree);
    Ok(out)
}

fn write_type(out: &mut String, node: &DecodedType) {
    match node {
        DecodedType::Hole(id) => {
            let _ = write!(out, "(hole {id})");
        }
        DecodedType::Ref(id) => {
            let _ = write!(out, "(ref {id})");
        }
        DecodedType::Var(delta) => {
            let _ = write!(out, "(var {delta})");
        }
        DecodedType::Apply { head, args } => {
            out.push_str("(apply ");
            write_type(out, head);
            for arg in args {
                out.push(' ');
                write_type(out, arg);
            }
            out.push(')');
        }
        DecodedType::Fun { params, ret } => {
            out.push_str("(fun (");
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_type(out, param);
            }
            out.push_str(") ");
            write_type(out, ret);
            out.push(')');
        }
        DecodedType::Forall { descriptor, body } => {
            out.push_str("(forall ");
            write_descriptor(out, descriptor);
            out.push(' ');
            write_type(out, body);
            out.push(')');
        }
    }
}

fn write_descriptor(out: &mut String, descriptor: &ForallDescriptor) {
    match descriptor {
        ForallDescriptor::None => out.push_str("_"),
        ForallDescriptor::Kind(kind) => write_kind(out, kind),
        ForallDescriptor::Constraints(terms) => {
            out.push('{');
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" + ");
                }
                write_type(out, term);
            }
            out.push('}');
        }
    }
}

fn write_kind(out: &mut String, kind: &DecodedKind) {
    match kind {
        DecodedKind::Concrete => out.push('*'),
        DecodedKind::Arrow(from, to) => {
            out.push('(');
            write_kind(out, from);
            out.push_str(" -> ");
            write_kind(out, to);
            out.push(')');
        }
    }
}
