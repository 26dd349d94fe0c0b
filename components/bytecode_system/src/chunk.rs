//! Compiled program container
//!
//! Holds the instruction sequence and the value pool it indexes into.

use std::collections::HashMap;
use std::fmt;

use core_types::JsError;
use serde::{Deserialize, Serialize};

use crate::constant::Constant;
use crate::instruction::Instruction;
use crate::opcode::Opcode;

/// A compiled program: instructions plus a value pool.
///
/// Pool slot 0 always holds the empty string, so `VALUE 0` pushes `""`.
/// A program is built once by the compiler and only read afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bytecode {
    instructions: Vec<Instruction>,
    pool: Vec<Constant>,
    #[serde(skip)]
    interned: HashMap<Constant, u32>,
}

impl Default for Bytecode {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Bytecode {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions && self.pool == other.pool
    }
}

impl Bytecode {
    /// Create an empty program with the empty-string pool sentinel
    pub fn new() -> Self {
        let sentinel = Constant::String(String::new());
        let mut interned = HashMap::new();
        interned.insert(sentinel.clone(), 0);
        Self {
            instructions: Vec::new(),
            pool: vec![sentinel],
            interned,
        }
    }

    /// Append an instruction and return its index
    pub fn add(&mut self, opcode: Opcode, operand: u32) -> usize {
        self.instructions.push(Instruction::new(opcode, operand));
        self.instructions.len() - 1
    }

    /// Append `VALUE` for a literal, interning it into the pool
    pub fn add_value(&mut self, constant: Constant) -> usize {
        let index = self.intern(constant);
        self.add(Opcode::Value, index)
    }

    /// Append `NAME` for an identifier, interning it into the pool
    pub fn add_name(&mut self, name: &str) -> usize {
        let index = self.intern(Constant::String(name.to_string()));
        self.add(Opcode::Name, index)
    }

    fn intern(&mut self, constant: Constant) -> u32 {
        if let Some(&index) = self.interned.get(&constant) {
            return index;
        }
        let index = self.pool.len() as u32;
        self.pool.push(constant.clone());
        self.interned.insert(constant, index);
        index
    }

    /// Overwrite the operand of an already emitted instruction
    pub fn patch(&mut self, index: usize, operand: u32) {
        if let Some(instruction) = self.instructions.get_mut(index) {
            instruction.operand = operand;
        }
    }

    /// Remove and return the last instruction
    pub fn pop(&mut self) -> Option<Instruction> {
        self.instructions.pop()
    }

    /// Move the block `[start, end)` to the end of the program, keeping
    /// the relative order inside both the block and the tail after it.
    pub fn rotate_to_end(&mut self, start: usize, end: usize) {
        if start < end && end <= self.instructions.len() {
            self.instructions[start..].rotate_left(end - start);
        }
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if no instruction was emitted
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction sequence
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at `index`
    pub fn instruction(&self, index: usize) -> Option<Instruction> {
        self.instructions.get(index).copied()
    }

    /// Pool entry at `index`
    pub fn constant(&self, index: u32) -> Option<&Constant> {
        self.pool.get(index as usize)
    }

    /// The value pool
    pub fn pool(&self) -> &[Constant] {
        &self.pool
    }

    /// Check the structural invariants of a program that did not come
    /// straight from the compiler (for example, one deserialized from disk):
    /// pool operands are in range, names are strings, every branch length
    /// lands exactly on its matching `ELSE` and `ENDIF`, and an optional
    /// chain skips only whole branches.
    pub fn validate(&self) -> Result<(), JsError> {
        let code = &self.instructions;
        let mut claimed = vec![false; code.len()];

        for (i, instruction) in code.iter().enumerate() {
            match instruction.opcode {
                Opcode::Value => {
                    if self.constant(instruction.operand).is_none() {
                        return Err(invalid(i, "value index out of range"));
                    }
                }
                Opcode::Name => match self.constant(instruction.operand) {
                    Some(Constant::String(_)) => {}
                    _ => return Err(invalid(i, "name index does not refer to a string")),
                },
                Opcode::If | Opcode::IfNotNull => {
                    let else_at = i + 1 + instruction.operand as usize;
                    let else_len = match code.get(else_at) {
                        Some(e) if e.opcode == Opcode::Else => e.operand as usize,
                        _ => return Err(invalid(i, "branch does not end at ELSE")),
                    };
                    let endif_at = else_at + 1 + else_len;
                    match code.get(endif_at) {
                        Some(e) if e.opcode == Opcode::EndIf => {}
                        _ => return Err(invalid(else_at, "else branch does not end at ENDIF")),
                    }
                    if claimed[else_at] || claimed[endif_at] {
                        return Err(invalid(i, "overlapping branches"));
                    }
                    claimed[else_at] = true;
                    claimed[endif_at] = true;
                }
                Opcode::QestDot => {
                    let chain = code
                        .get(i + 1..i + 1 + instruction.operand as usize)
                        .ok_or_else(|| invalid(i, "optional chain runs past the end"))?;
                    let mut depth = 0usize;
                    for inner in chain {
                        match inner.opcode {
                            Opcode::If | Opcode::IfNotNull => depth += 1,
                            Opcode::EndIf => {
                                depth = depth
                                    .checked_sub(1)
                                    .ok_or_else(|| invalid(i, "optional chain crosses a branch"))?;
                            }
                            _ => {}
                        }
                    }
                    if depth != 0 {
                        return Err(invalid(i, "optional chain crosses a branch"));
                    }
                }
                _ => {}
            }
        }

        for (i, instruction) in code.iter().enumerate() {
            if matches!(instruction.opcode, Opcode::Else | Opcode::EndIf) && !claimed[i] {
                return Err(invalid(i, "unmatched branch marker"));
            }
        }
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON and validate
    pub fn from_json(json: &str) -> Result<Self, JsError> {
        let mut bytecode: Bytecode = serde_json::from_str(json)
            .map_err(|e| JsError::internal(format!("Invalid bytecode: {}", e)))?;
        if bytecode.pool.first() != Some(&Constant::String(String::new())) {
            return Err(JsError::internal("Invalid bytecode: missing empty-string sentinel"));
        }
        bytecode.validate()?;
        bytecode.interned = bytecode
            .pool
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as u32))
            .collect();
        Ok(bytecode)
    }
}

fn invalid(at: usize, what: &str) -> JsError {
    JsError::internal(format!("Invalid bytecode at {}: {}", at, what))
}

/// Disassembly: one instruction per line, branch bodies indented by a tab.
impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0usize;
        for instruction in &self.instructions {
            let opcode = instruction.opcode;
            let level = match opcode {
                Opcode::Else | Opcode::EndIf => depth.saturating_sub(1),
                _ => depth,
            };
            for _ in 0..level {
                f.write_str("\t")?;
            }
            f.write_str(opcode.name())?;
            match opcode {
                Opcode::Value => match self.constant(instruction.operand) {
                    Some(constant) => write!(f, " {}", constant)?,
                    None => write!(f, " #{}", instruction.operand)?,
                },
                Opcode::Name => match self.constant(instruction.operand) {
                    Some(Constant::String(name)) => write!(f, " {}", name)?,
                    _ => write!(f, " #{}", instruction.operand)?,
                },
                op if op.has_operand() => write!(f, " {}", instruction.operand)?,
                _ => {}
            }
            f.write_str("\n")?;
            match opcode {
                Opcode::If | Opcode::IfNotNull => depth += 1,
                Opcode::EndIf => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Ok(())
    }
}
