//! Errors produced by the runtime.
//!
//! [`RuntimeError`] aborts a run. [`SyntaxError`]s never do: they are
//! collected while the parser recovers and returned with the tree.

use serde::Serialize;

use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("rule `{0}` is not defined")]
    UnknownRule(String),

    #[error("token `{0}` has no type in the vocabulary")]
    UnknownToken(String),

    #[error("literal {0} has no type in the vocabulary")]
    UnknownLiteral(String),

    /// Execution fuel exhausted (too many interpreter steps).
    #[error("runtime execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (too many nested rule invocations).
    #[error("runtime recursion limit exceeded")]
    RecursionLimitExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxErrorKind {
    /// An unexpected token was discarded.
    ExtraneousInput,
    /// A token was virtually inserted.
    MissingToken,
    /// The current token matched nothing expected here.
    MismatchedInput,
    /// Prediction failed after looking past the first token.
    NoViableAlt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: u32,
    pub column: u32,
    pub message: String,
    /// Token the error was reported at.
    pub offending: Token,
    /// Innermost rule being parsed.
    pub rule: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.column, self.message)
    }
}

/// Syntax errors of one parse run, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SyntaxErrors {
    errors: Vec<SyntaxError>,
}

impl SyntaxErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyntaxError> {
        self.errors.iter()
    }

    pub fn kinds(&self) -> Vec<SyntaxErrorKind> {
        self.errors.iter().map(|e| e.kind).collect()
    }

    /// One `line L:C message` per error.
    pub fn render(&self) -> String {
        let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        lines.join("\n")
    }
}

impl std::ops::Index<usize> for SyntaxErrors {
    type Output = SyntaxError;

    fn index(&self, index: usize) -> &SyntaxError {
        &self.errors[index]
    }
}

impl<'a> IntoIterator for &'a SyntaxErrors {
    type Item = &'a SyntaxError;
    type IntoIter = std::slice::Iter<'a, SyntaxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
