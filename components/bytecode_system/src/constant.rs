//! Literal values stored in a program's value pool

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A pool entry: a literal value or an identifier name.
///
/// Numbers compare by bit pattern so that equal literals (including `NaN`)
/// share one pool slot while `0` and `-0` stay distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constant {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Numeric literal
    Number(f64),
    /// String literal or identifier name
    String(String),
    /// Regular expression literal
    RegExp {
        /// Pattern text between the slashes
        pattern: String,
        /// Flag letters after the closing slash
        flags: String,
    },
}

impl Constant {
    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constant::Undefined, Constant::Undefined) => true,
            (Constant::Null, Constant::Null) => true,
            (Constant::Boolean(a), Constant::Boolean(b)) => a == b,
            (Constant::Number(a), Constant::Number(b)) => a.to_bits() == b.to_bits(),
            (Constant::String(a), Constant::String(b)) => a == b,
            (
                Constant::RegExp { pattern: p1, flags: f1 },
                Constant::RegExp { pattern: p2, flags: f2 },
            ) => p1 == p2 && f1 == f2,
            _ => false,
        }
    }
}

impl Eq for Constant {}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Constant::Undefined | Constant::Null => {}
            Constant::Boolean(b) => b.hash(state),
            Constant::Number(n) => n.to_bits().hash(state),
            Constant::String(s) => s.hash(state),
            Constant::RegExp { pattern, flags } => {
                pattern.hash(state);
                flags.hash(state);
            }
        }
    }
}

/// Literal rendering used by the disassembler.
impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Undefined => f.write_str("undefined"),
            Constant::Null => f.write_str("null"),
            Constant::Boolean(b) => write!(f, "{}", b),
            Constant::Number(n) => f.write_str(&core_types::format_number(*n)),
            Constant::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            Constant::RegExp { pattern, flags } => write!(f, "/{}/{}", pattern, flags),
        }
    }
}
