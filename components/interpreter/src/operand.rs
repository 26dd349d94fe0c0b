//! Execution stack slots

use core_types::Value;

use crate::lazy_ref::LazyRef;

/// One slot of the execution stack.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A resolved value
    Value(Value),
    /// An unresolved property reference
    Ref(LazyRef),
    /// A reference that was already read by a branch test. The value is
    /// reused by later reads; the reference stays usable as an assignment
    /// target.
    Cached(LazyRef, Value),
    /// A value flagged for flattening into the enclosing array, object or
    /// argument list
    Spread(Value),
}

impl Operand {
    /// The reference this slot can be written through, if any.
    pub fn reference(&self) -> Option<&LazyRef> {
        match self {
            Operand::Ref(reference) | Operand::Cached(reference, _) => Some(reference),
            _ => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}
