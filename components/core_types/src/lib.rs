//! Core value types and error handling for the sandboxed evaluator.
//!
//! This crate provides the runtime value model shared by the compiler and
//! the executor: the dynamically-typed [`Value`] union, the native object
//! model used when no interception handler overrides an operation, the
//! coercion rules of the evaluated language, and the error type.
//!
//! # Overview
//!
//! - [`Value`] - Tagged union of runtime values
//! - [`JsObject`], [`JsArray`], [`JsFunction`], [`JsRegExp`] - Reference types
//! - [`Deferred`] - Pending asynchronous result returned by host functions
//! - [`JsError`] / [`ErrorKind`] - Located errors
//! - [`SourcePosition`] - 1-based line/column location
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Number(42.0);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//! assert_eq!(num.to_string(), "42");
//!
//! let error = JsError::type_error("undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod conversion;
mod deferred;
mod error;
mod function;
mod number;
mod object;
mod regexp;
mod source;
mod value;

pub use deferred::Deferred;
pub use error::{ErrorKind, JsError};
pub use function::{JsFunction, NativeFn};
pub use number::format_number;
pub use object::{JsArray, JsObject, PropertyMap};
pub use regexp::JsRegExp;
pub use source::SourcePosition;
pub use value::{Value, MAX_ARRAY_LENGTH};
