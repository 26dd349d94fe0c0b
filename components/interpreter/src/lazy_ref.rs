//! Deferred property references
//!
//! `NAME`, `DOT`, `QEST_DOT` and `GET` do not read anything. They leave a
//! [`LazyRef`] on the stack, and the opcode that consumes it decides whether
//! the pair is read, written, called, constructed or deleted.

use core_types::{JsError, Value};

use crate::handler::Handler;

/// A receiver and a property name, resolved only when used.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyRef {
    receiver: Value,
    name: String,
}

impl LazyRef {
    /// Creates a reference to `receiver[name]`.
    pub fn new(receiver: Value, name: impl Into<String>) -> Self {
        LazyRef {
            receiver,
            name: name.into(),
        }
    }

    /// The object the property is looked up on.
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    /// The property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rebinds the reference to a new receiver, keeping the name.
    pub fn bind(self, receiver: Value) -> Self {
        LazyRef {
            receiver,
            name: self.name,
        }
    }

    /// Reads the property.
    pub fn get(&self, env: &Value, handler: &dyn Handler) -> Result<Value, JsError> {
        self.check_receiver("read", "reading")?;
        handler.get(&self.receiver, &self.name, env)
    }

    /// Writes the property and returns the written value.
    pub fn set(&self, value: Value, env: &Value, handler: &dyn Handler) -> Result<Value, JsError> {
        self.check_receiver("set", "setting")?;
        handler.set(&self.receiver, &self.name, value.clone(), env)?;
        Ok(value)
    }

    /// Removes the property.
    pub fn delete(&self, handler: &dyn Handler) -> Result<bool, JsError> {
        self.check_receiver("delete", "deleting")?;
        handler.delete_property(&self.receiver, &self.name)
    }

    fn check_receiver(&self, verb: &str, gerund: &str) -> Result<(), JsError> {
        if self.receiver.is_nullish() {
            return Err(JsError::type_error(format!(
                "Cannot {} properties of {} ({} '{}')",
                verb, self.receiver, gerund, self.name
            )));
        }
        Ok(())
    }
}
