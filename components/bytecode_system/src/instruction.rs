//! Bytecode instruction representation
//!
//! An instruction is a fixed-width opcode/operand pair. The operand is either
//! an inline count (arguments, elements, branch lengths) or a pool index.

use serde::{Deserialize, Serialize};

use crate::opcode::Opcode;

/// A single bytecode instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// The opcode for this instruction
    pub opcode: Opcode,
    /// Inline count or pool index; zero when unused
    pub operand: u32,
}

impl Instruction {
    /// Create a new instruction
    pub fn new(opcode: Opcode, operand: u32) -> Self {
        Self { opcode, operand }
    }
}
