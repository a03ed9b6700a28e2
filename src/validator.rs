// src/validator.rs

use crate::ast::{BinOp, Node};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::functions::UnaryFunc;
use crate::math::DIVISION_EPSILON;

/// Statically rejects literal domain errors: division by a zero constant,
/// `log`/`ln` of a non-positive constant and `sqrt` of a negative constant.
///
/// Variable-dependent occurrences pass here and surface later as NaN. Every
/// offending site is reported; the tree is never modified.
pub fn validate(node: &Node, diagnostics: &mut dyn DiagnosticSink) -> bool {
    let here = match check_node(node) {
        Some(diagnostic) => {
            diagnostics.report(diagnostic);
            false
        }
        None => true,
    };

    node.children()
        .into_iter()
        .fold(here, |ok, child| validate(child, diagnostics) && ok)
}

fn check_node(node: &Node) -> Option<Diagnostic> {
    match node {
        Node::BinaryOp(BinOp::Div, _, divisor) => match divisor.as_number() {
            Some(d) if d.abs() < DIVISION_EPSILON => Some(Diagnostic::DivisionByZero),
            _ => None,
        },
        Node::Function1(func @ (UnaryFunc::Log | UnaryFunc::Ln), arg) => match arg.as_number() {
            Some(value) if value <= 0.0 => Some(Diagnostic::LogOfNonPositive {
                func: func.name(),
                value,
            }),
            _ => None,
        },
        Node::Function1(UnaryFunc::Sqrt, arg) => match arg.as_number() {
            Some(value) if value < 0.0 => Some(Diagnostic::SqrtOfNegative(value)),
            _ => None,
        },
        _ => None,
    }
}
