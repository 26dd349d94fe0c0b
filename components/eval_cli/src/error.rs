//! Error types for the CLI

use core_types::JsError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Compilation or evaluation failed
    #[error(transparent)]
    Eval(#[from] JsError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Line editor failure
    #[error("REPL error: {0}")]
    Repl(#[from] rustyline::error::ReadlineError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
