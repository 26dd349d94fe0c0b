//! Stack machine for compiled expression programs
//!
//! This crate executes [`Bytecode`](bytecode_system::Bytecode) produced by
//! the `parser` crate:
//! - Flat dispatch loop over one operand stack and a stack of scope frames
//! - Property references resolved lazily, only when read, written, called,
//!   constructed or deleted
//! - Every property and call operation routed through a [`Handler`]
//! - A single suspension point: awaiting a host function's deferred result
//!
//! # Example
//!
//! ```
//! use core_types::Value;
//! use interpreter::{evaluate_blocking, NativeHandler};
//!
//! let env = Value::object([("a", Value::Number(1.0))]);
//!
//! let result = evaluate_blocking("a ||= 2", &env, &NativeHandler).unwrap();
//! assert_eq!(result, Value::Number(1.0));
//!
//! let result = evaluate_blocking("`a is ${a}`", &env, &NativeHandler).unwrap();
//! assert_eq!(result, Value::from("a is 1"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dispatch;
pub mod handler;
pub mod lazy_ref;
pub mod operand;
pub mod operators;
pub mod scope_frame;
pub mod vm;

// Re-export main types at crate root
pub use dispatch::Dispatcher;
pub use handler::{Handler, NativeHandler};
pub use lazy_ref::LazyRef;
pub use operand::Operand;
pub use scope_frame::ScopeFrame;
pub use vm::{evaluate, evaluate_blocking, Program, Vm};
