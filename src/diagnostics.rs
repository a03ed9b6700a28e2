// src/diagnostics.rs

//! Human-readable reports from the validator and evaluator.
//!
//! The core never aborts: problems are handed to a caller-supplied
//! [`DiagnosticSink`] and mirrored as `tracing` warnings. The text is for
//! display only.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("Division by constant zero detected")]
    DivisionByZero,
    #[error("{func} of non-positive constant ({value:.2})")]
    LogOfNonPositive { func: &'static str, value: f64 },
    #[error("sqrt of negative constant ({0:.2})")]
    SqrtOfNegative(f64),
    #[error("Undefined identifier '{0}'")]
    UndefinedIdentifier(String),
    #[error("Expansion of '{0}' exceeded the recursion limit")]
    RecursionLimit(String),
}

impl Diagnostic {
    /// True for the reports produced by static validation.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Diagnostic::DivisionByZero
                | Diagnostic::LogOfNonPositive { .. }
                | Diagnostic::SqrtOfNegative(_)
        )
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "diagnostic reported");
        self.push(diagnostic);
    }
}

/// Discards reports after logging them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnly;

impl DiagnosticSink for LogOnly {
    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "diagnostic reported");
    }
}
