//! Parser error types and helpers

use core_types::{JsError, SourcePosition};

/// Create a syntax error at a given position
pub fn syntax_error(message: impl Into<String>, position: SourcePosition) -> JsError {
    JsError::syntax(message, position)
}

/// Create an unexpected token error for a token's text
pub fn unexpected_token(got: &str, position: SourcePosition) -> JsError {
    if got.is_empty() {
        syntax_error("Unexpected token", position)
    } else {
        syntax_error(format!("Unexpected token {}", got), position)
    }
}

/// Create an unexpected end of input error
pub fn unexpected_eof(position: SourcePosition) -> JsError {
    syntax_error("Unexpected end of input", position)
}
