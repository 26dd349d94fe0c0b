//! Expression evaluator CLI library
//!
//! Provides the [`Runtime`] and supporting modules for the `safe-eval`
//! binary: argument parsing, a demo host environment and a REPL.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod host;
pub mod repl;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::Runtime;
