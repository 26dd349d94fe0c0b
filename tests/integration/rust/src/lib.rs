//! Integration test suite for the expression evaluator
//!
//! This crate holds tests that cross component boundaries: source text
//! through the compiler, persisted bytecode back into the executor, and
//! the CLI runtime on top of both.

/// Re-export components for test convenience
pub mod components {
    pub use bytecode_system;
    pub use core_types;
    pub use eval_cli;
    pub use interpreter;
    pub use parser;
}
