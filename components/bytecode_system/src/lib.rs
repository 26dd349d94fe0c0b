//! Bytecode representation for the sandboxed expression evaluator
//!
//! This crate provides the instruction set, the fixed-width instruction
//! encoding, the value pool and the [`Bytecode`] program container shared
//! by the compiler and the stack machine.
//!
//! # Features
//!
//! - Closed opcode set with precedence and associativity per opcode
//! - Interned value pool with the empty string at slot 0
//! - Disassembly through `Display`
//! - serde serialization with structural validation on load
//!
//! # Example
//!
//! ```
//! use bytecode_system::{Bytecode, Constant, Opcode};
//!
//! let mut bytecode = Bytecode::new();
//!
//! // 1 + x
//! bytecode.add_value(Constant::Number(1.0));
//! bytecode.add_name("x");
//! bytecode.add(Opcode::Add, 0);
//!
//! assert_eq!(bytecode.to_string(), "VALUE 1\nNAME x\nADD\n");
//!
//! let json = bytecode.to_json().unwrap();
//! let restored = Bytecode::from_json(&json).unwrap();
//! assert_eq!(restored, bytecode);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod constant;
pub mod instruction;
pub mod opcode;

// Re-export main types at crate root
pub use chunk::Bytecode;
pub use constant::Constant;
pub use instruction::Instruction;
pub use opcode::Opcode;
