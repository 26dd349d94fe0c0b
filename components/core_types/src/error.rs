//! Error types raised while compiling or evaluating code.
//!
//! Every failure carries an [`ErrorKind`] matching the evaluated language's
//! built-in error constructors, a message, and (for compile-time failures)
//! the position in the source text.

use std::fmt;

use thiserror::Error;

use crate::SourcePosition;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed source text
    SyntaxError,
    /// Operation applied to a value of the wrong type (e.g., calling a non-function)
    TypeError,
    /// Invalid reference, such as assigning to a literal
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Internal engine error (malformed bytecode, stack imbalance)
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// An error with kind, message and optional source position.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, SourcePosition};
///
/// let error = JsError::syntax("Unbalanced braces", SourcePosition::new(1, 4, 3));
///
/// assert_eq!(error.kind, ErrorKind::SyntaxError);
/// assert_eq!(error.to_string(), "SyntaxError at 1:4: Unbalanced braces");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source position where the error occurred
    pub source_position: Option<SourcePosition>,
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_position {
            Some(pos) => write!(f, "{} at {}: {}", self.kind, pos, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl JsError {
    /// Creates an error of the given kind without a position.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError {
            kind,
            message: message.into(),
            source_position: None,
        }
    }

    /// Creates a located syntax error.
    pub fn syntax(message: impl Into<String>, position: SourcePosition) -> Self {
        JsError::new(ErrorKind::SyntaxError, message).with_position(position)
    }

    /// Creates a type error.
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::TypeError, message)
    }

    /// Creates a reference error.
    pub fn reference(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::ReferenceError, message)
    }

    /// Creates a range error.
    pub fn range(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::RangeError, message)
    }

    /// Creates an internal engine error.
    pub fn internal(message: impl Into<String>) -> Self {
        JsError::new(ErrorKind::InternalError, message)
    }

    /// Attaches a source position.
    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.source_position = Some(position);
        self
    }
}
