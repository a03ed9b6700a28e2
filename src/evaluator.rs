// src/evaluator.rs

use tracing::trace;

use crate::ast::{BinOp, Node};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::RangeError;
use crate::math::{self, DERIVATIVE_STEP};
use crate::symtab::SymbolTable;

/// Maximum nesting of stored-function expansions before giving up with NaN.
pub const MAX_CALL_DEPTH: usize = 64;

/// Largest number of points a `SampleRange` may produce.
pub const MAX_SAMPLE_POINTS: usize = 1_000_000;

/// Tree-walking interpreter for a single free variable.
///
/// Evaluation is total: domain errors and near-zero divisors give NaN,
/// unresolved identifiers are reported to the diagnostic sink and give NaN.
pub struct Evaluator<'a> {
    symbols: &'a SymbolTable,
    diagnostics: &'a mut dyn DiagnosticSink,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(symbols: &'a SymbolTable, diagnostics: &'a mut dyn DiagnosticSink) -> Self {
        Evaluator { symbols, diagnostics, depth: 0 }
    }

    pub fn evaluate(&mut self, node: &Node, x: f64) -> f64 {
        match node {
            Node::Number(n) => *n,
            Node::Var => x,
            Node::Identifier(name) => self.resolve(name, x),

            Node::BinaryOp(op, left, right) => {
                let a = self.evaluate(left, x);
                let b = self.evaluate(right, x);
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => math::checked_div(a, b),
                    BinOp::Pow => a.powf(b),
                }
            }

            Node::Negate(operand) => -self.evaluate(operand, x),
            Node::Function1(func, arg) => func.apply(self.evaluate(arg, x)),
            Node::Function2(func, a, b) => {
                let a = self.evaluate(a, x);
                let b = self.evaluate(b, x);
                func.apply(a, b)
            }

            Node::Derivative(_, arg) => {
                let plus = self.evaluate(arg, x + DERIVATIVE_STEP);
                let minus = self.evaluate(arg, x - DERIVATIVE_STEP);
                math::central_difference(plus, minus)
            }
        }
    }

    // Variables shadow functions. A stored function is a body in the ambient
    // x, so it is evaluated at the same point rather than called.
    fn resolve(&mut self, name: &str, x: f64) -> f64 {
        if let Some(value) = self.symbols.lookup_variable(name) {
            return value;
        }
        let symbols = self.symbols;
        match symbols.lookup_function(name) {
            Some(body) => {
                if self.depth >= MAX_CALL_DEPTH {
                    self.diagnostics.report(Diagnostic::RecursionLimit(name.to_string()));
                    return f64::NAN;
                }
                self.depth += 1;
                let value = self.evaluate(body, x);
                self.depth -= 1;
                value
            }
            None => {
                self.diagnostics.report(Diagnostic::UndefinedIdentifier(name.to_string()));
                f64::NAN
            }
        }
    }

    /// Evaluates `node` at every point of `range`, keeping non-finite results.
    pub fn sample(&mut self, node: &Node, range: &SampleRange) -> Vec<Sample> {
        let samples: Vec<Sample> = range
            .points()
            .map(|x| Sample { x, y: self.evaluate(node, x) })
            .collect();
        trace!(count = samples.len(), "sampled range");
        samples
    }
}

/// One-shot evaluation against a symbol table.
pub fn evaluate(node: &Node, x: f64, symbols: &SymbolTable, diagnostics: &mut dyn DiagnosticSink) -> f64 {
    Evaluator::new(symbols, diagnostics).evaluate(node, x)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

pub fn finite_samples(samples: &[Sample]) -> impl Iterator<Item = &Sample> {
    samples.iter().filter(|s| s.y.is_finite())
}

/// Closed sampling interval `[min, max]` walked in steps of `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRange {
    min: f64,
    max: f64,
    step: f64,
}

impl Default for SampleRange {
    fn default() -> Self {
        SampleRange { min: -10.0, max: 10.0, step: 0.1 }
    }
}

impl SampleRange {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, RangeError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RangeError::NonFiniteBound);
        }
        if !(step > 0.0) || !step.is_finite() {
            return Err(RangeError::NonPositiveStep(step));
        }
        if min > max {
            return Err(RangeError::Inverted { min, max });
        }
        point_count(min, max, step)
            .filter(|&count| count <= MAX_SAMPLE_POINTS)
            .ok_or(RangeError::TooManyPoints { limit: MAX_SAMPLE_POINTS })?;
        Ok(SampleRange { min, max, step })
    }

    pub fn min(&self) -> f64 { self.min }
    pub fn max(&self) -> f64 { self.max }
    pub fn step(&self) -> f64 { self.step }

    /// Number of points; a valid range always has at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        // Bounded by `new`, and `Default` is well inside the cap.
        point_count(self.min, self.max, self.step).unwrap_or(1)
    }

    /// Points are computed as `min + i * step` so error does not accumulate.
    pub fn points(&self) -> impl Iterator<Item = f64> {
        let SampleRange { min, step, .. } = *self;
        (0..self.len()).map(move |i| min + i as f64 * step)
    }
}

// `None` when the count is not representable, e.g. `max - min` overflowed.
fn point_count(min: f64, max: f64, step: f64) -> Option<usize> {
    let intervals = ((max - min) / step + 1e-9).floor();
    if !intervals.is_finite() || intervals >= usize::MAX as f64 {
        return None;
    }
    (intervals as usize).checked_add(1)
}
