// src/error.rs

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at {line}:{col}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("Unexpected character: '{0}'")]
    UnexpectedChar(char),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
}

/// Rejections from the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("cannot store {kind} '{name}': table is full ({capacity} entries)")]
    CapacityExceeded {
        kind: SymbolKind,
        name: String,
        capacity: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("range bounds must be finite")]
    NonFiniteBound,
    #[error("empty range: min {min} is greater than max {max}")]
    Inverted { min: f64, max: f64 },
    #[error("range would produce more than {limit} points")]
    TooManyPoints { limit: usize },
}
