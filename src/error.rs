//! Error types.
//!
//! Verification *failures* are not errors: they are reported as values in a
//! [`Report`][crate::verifier::Report]. The types here cover malformed input
//! ([`ParseError`]), malformed models ([`ModelError`]) and inconclusive oracle
//! queries ([`OracleError`]), the latter being fatal for a verification run.

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use thiserror::Error;

/// Byte range into the parsed text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{found}' at {span}")]
    UnexpectedCharacter { found: char, span: Span },

    #[error("unexpected token '{found}' at {span}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        span: Span,
    },

    #[error("unexpected end of input at {span}, expected {expected}")]
    UnexpectedEnd { expected: &'static str, span: Span },

    #[error("unbalanced parenthesis at {span}")]
    UnbalancedParenthesis { span: Span },

    #[error("variable '{name}' at {span} is not Boolean and cannot appear in a condition")]
    NotBoolean { name: String, span: Span },

    #[error("condition nested deeper than {limit} levels at {span}")]
    TooDeep { limit: usize, span: Span },
}

impl ParseError {
    /// The offending span.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedCharacter { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEnd { span, .. }
            | ParseError::UnbalancedParenthesis { span }
            | ParseError::NotBoolean { span, .. }
            | ParseError::TooDeep { span, .. } => *span,
        }
    }
}

/// Schema violations in a model under construction.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ModelError {
    #[error("state machine '{0}' already exists")]
    DuplicateMachine(String),

    #[error("state '{state}' already exists in state machine '{machine}'")]
    DuplicateState { machine: String, state: String },

    #[error("variable '{name}' is already declared with domain {existing}")]
    DomainMismatch { name: String, existing: String },

    #[error("value '{value}' is not in the domain of variable '{variable}'")]
    UnknownValue { variable: String, value: String },
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum OracleError {
    #[error("SAT query timed out after {limit:?}")]
    Timeout { limit: Duration },

    #[error("SAT query exceeded the limit of {limit} decision diagram nodes")]
    NodeLimit { limit: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}
