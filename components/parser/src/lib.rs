//! Expression Compiler Component
//!
//! Turns source text into [`Bytecode`](bytecode_system::Bytecode) for the
//! stack machine in the `interpreter` crate.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes source text, keeping whitespace and comments
//! - [`Token`] - Token with type tag, raw text, decoded value and position
//! - [`TokenSource`] - Any iterator of tokens the compiler can pull from
//! - [`compile`] / [`compile_tokens`] - Single-pass compilation without a
//!   syntax tree; operator precedence is resolved by reordering emitted
//!   instructions
//!
//! # Example
//!
//! ```
//! use parser::compile;
//!
//! let bytecode = compile("a && b").unwrap();
//! assert_eq!(
//!     bytecode.to_string(),
//!     "NAME a\nIF 2\n\tDISCARD\n\tNAME b\nELSE 0\nENDIF\n"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod error;
pub mod lexer;
pub mod token;

pub use compiler::{compile, compile_tokens};
pub use lexer::Lexer;
pub use token::{Token, TokenSource, TokenType};
