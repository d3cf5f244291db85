//! Error types for parsing and checker evaluation.
//!
//! Neither error ever escapes the test orchestrator: a [`ParseError`]
//! degrades the feature context to its defaults and a [`CheckerError`]
//! turns into a failing test result with a diagnostic message.

use thiserror::Error;

/// A failure to parse submitted source code.
///
/// Carries only a message and the position where the parser gave up; no
/// partial tree is ever exposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({line}:{column})")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// 1-based line of the offending token.
    pub line: u32,
    /// 1-based column of the offending token.
    pub column: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Errors raised while compiling or evaluating a checker expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckerError {
    /// The expression is not valid checker syntax.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The expression names something that is not a context attribute.
    #[error("{0} is not defined")]
    UnknownIdentifier(String),

    /// An operation was applied to a value that does not support it.
    #[error("type error: {0}")]
    TypeMismatch(String),

    /// The expression nests deeper than the evaluator allows.
    #[error("expression nesting exceeds {0} levels")]
    DepthExceeded(usize),

    /// The context was extracted from source that failed to parse.
    #[error("context is unavailable: {0}")]
    BrokenContext(String),
}

impl CheckerError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        CheckerError::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Returns `true` if the error comes from the expression text itself
    /// rather than from the context it was evaluated against.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            CheckerError::Syntax { .. } | CheckerError::DepthExceeded(_)
        )
    }
}
