//! Error types for Parley.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ParleyError`] - Top-level error type
//! - [`TokenizeError`] - Malformed quoting or escaping, with position
//! - [`BuildError`] - Invalid command declarations
//! - [`InvokeError`] - Faults raised inside the middleware pipeline
//! - [`ArgumentError`] - Typed access to bound arguments
//! - [`PathError`] - Invalid path sub-ranges
//!
//! Only [`TokenizeError`] is surfaced to dispatch callers as an error; every
//! other request failure becomes an [`Outcome`](crate::Outcome) value.

use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for Parley setup and parsing.
#[derive(Error, Debug)]
pub enum ParleyError {
    /// The input could not be tokenized.
    #[error("tokenize error: {0}")]
    Tokenize(#[from] TokenizeError),

    /// A command declaration was rejected.
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// A command source failed to load.
    #[error("command source failed: {0}")]
    Source(#[source] BoxError),

    /// A pipeline fault.
    #[error("invoke error: {0}")]
    Invoke(#[from] InvokeError),
}

/// A path sub-range that does not fit its buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The range is inverted, too long, or not on a character boundary.
    #[error("range {start}..{end} is out of bounds for text of length {len}")]
    OutOfRange {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
        /// Length of the text in bytes.
        len: usize,
    },
}

/// What went wrong while tokenizing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    /// A quote appeared inside an unquoted token.
    #[error("a quote must be preceded by a separator")]
    QuoteWithoutSeparator,

    /// The input ended right after an escape character.
    #[error("unfinished escape sequence")]
    UnfinishedEscape,

    /// The character after an escape is not escapable.
    #[error("character `{0}` cannot be escaped")]
    InvalidEscape(char),

    /// The input ended inside a quoted string.
    #[error("unterminated quoted string")]
    UnterminatedQuote,
}

/// A lexical error with the offending character's position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at position {position}")]
pub struct TokenizeError {
    kind: TokenizeErrorKind,
    input: Arc<str>,
    position: usize,
}

impl TokenizeError {
    /// Create a new tokenize error.
    pub fn new(kind: TokenizeErrorKind, input: Arc<str>, position: usize) -> Self {
        Self {
            kind,
            input,
            position,
        }
    }

    /// The error kind.
    pub fn kind(&self) -> TokenizeErrorKind {
        self.kind
    }

    /// The human-readable message, without position.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// The full original input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Byte offset of the offending character in [`TokenizeError::input`].
    pub fn position(&self) -> usize {
        self.position
    }

    /// Character index of the offending character, counting Unicode scalar
    /// values rather than bytes.
    pub fn char_index(&self) -> usize {
        self.input[..self.position.min(self.input.len())]
            .chars()
            .count()
    }

    /// Render the input with a caret under the offending character.
    pub fn caret(&self) -> String {
        let column = self.char_index();
        format!(
            "{}\n{:>width$} {}",
            self.input,
            "^",
            self.kind,
            width = column + 1
        )
    }
}

/// A command declaration that cannot be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A segment or parameter name was empty.
    #[error("names must not be empty")]
    EmptyName,

    /// A segment name contained whitespace.
    #[error("name `{0}` must not contain whitespace")]
    InvalidName(String),

    /// Two parameters share a name.
    #[error("command `{command}` declares parameter `{parameter}` twice")]
    DuplicateParameter {
        /// The command being built.
        command: String,
        /// The repeated parameter name.
        parameter: String,
    },

    /// A remainder parameter was followed by another parameter.
    #[error("remainder parameter `{parameter}` of `{command}` must be last")]
    RemainderNotLast {
        /// The command being built.
        command: String,
        /// The misplaced remainder parameter.
        parameter: String,
    },

    /// No handler was supplied.
    #[error("command `{0}` has no handler")]
    MissingHandler(String),
}

/// Failed typed access to a bound argument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// No value was bound under this name.
    #[error("argument `{0}` was not bound")]
    Missing(String),

    /// A value was bound, but with another type.
    #[error("argument `{name}` is not a `{expected}`")]
    TypeMismatch {
        /// Parameter name.
        name: String,
        /// The requested type.
        expected: &'static str,
    },
}

/// Faults raised while running the middleware pipeline.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// Cancellation was observed.
    #[error("invocation was cancelled")]
    Cancelled,

    /// A stage gave up waiting.
    #[error("invocation timed out after {0:?}")]
    Timeout(Duration),

    /// The handler or a stage panicked.
    #[error("invocation panicked: {0}")]
    Panic(String),

    /// The pipeline reached its end without a resolved command.
    #[error("no command is bound to the context")]
    Unbound,

    /// The handler or a stage returned an error.
    #[error(transparent)]
    Handler(BoxError),
}

impl InvokeError {
    /// Whether this error represents cancellation rather than failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvokeError::Cancelled)
    }
}

// Convenience conversions
impl From<BoxError> for InvokeError {
    fn from(err: BoxError) -> Self {
        match err.downcast::<InvokeError>() {
            Ok(inner) => *inner,
            Err(err) => InvokeError::Handler(err),
        }
    }
}

impl From<BoxError> for ParleyError {
    fn from(err: BoxError) -> Self {
        ParleyError::Source(err)
    }
}
