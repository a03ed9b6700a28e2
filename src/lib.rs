// src/lib.rs

// --- Module Declarations ---
pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod math;
pub mod optimizer;
pub mod parser;
pub mod pretty;
pub mod symtab;
pub mod tac;
pub mod validator;

// --- Public API Re-exports ---
pub use ast::{BinOp, Node};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use error::{ParseError, RangeError, SymbolError};
pub use evaluator::{evaluate, Evaluator, Sample, SampleRange};
pub use functions::{BinaryFunc, UnaryFunc};
pub use optimizer::optimize;
pub use parser::parse;
pub use symtab::SymbolTable;
pub use tac::{generate_tac, Instruction, Operand, TacSession};
pub use validator::validate;

/// Validates `node` and, if it passes, returns its constant-folded form.
///
/// A tree that fails validation is dropped; the reasons are in `diagnostics`.
pub fn prepare(node: Node, diagnostics: &mut dyn DiagnosticSink) -> Option<Node> {
    if validate(&node, diagnostics) {
        Some(optimize(node))
    } else {
        None
    }
}
