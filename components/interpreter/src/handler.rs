//! Interception handler
//!
//! Every property read, write and delete, and every call and construction
//! performed by evaluated code goes through a [`Handler`]. Embedders override
//! the operations they want to observe or forbid; the provided methods fall
//! back to the native object model in `core_types`.

use core_types::{JsError, Value};

/// Capability set consulted by the executor.
///
/// All methods have native defaults, so an implementation only overrides
/// what it needs.
///
/// # Examples
///
/// ```
/// use core_types::{JsError, Value};
/// use interpreter::{evaluate_blocking, Handler};
///
/// /// Refuses every write.
/// struct ReadOnly;
///
/// impl Handler for ReadOnly {
///     fn set(&self, _receiver: &Value, key: &str, _value: Value, _env: &Value) -> Result<(), JsError> {
///         Err(JsError::type_error(format!("'{}' is read-only", key)))
///     }
/// }
///
/// let env = Value::object([("a", Value::Number(1.0))]);
/// assert_eq!(evaluate_blocking("a + 1", &env, &ReadOnly).unwrap(), Value::Number(2.0));
/// assert!(evaluate_blocking("a = 2", &env, &ReadOnly).is_err());
/// ```
pub trait Handler {
    /// Reads `receiver[key]`. `env` is the evaluation environment.
    fn get(&self, receiver: &Value, key: &str, env: &Value) -> Result<Value, JsError> {
        let _ = env;
        receiver.get_property(key)
    }

    /// Writes `receiver[key] = value`.
    fn set(&self, receiver: &Value, key: &str, value: Value, env: &Value) -> Result<(), JsError> {
        let _ = env;
        receiver.set_property(key, value)
    }

    /// Removes `receiver[key]`, returning whether the property is gone.
    fn delete_property(&self, receiver: &Value, key: &str) -> Result<bool, JsError> {
        receiver.delete_property(key)
    }

    /// Invokes `function` with `this` bound to `receiver`.
    fn apply(&self, function: &Value, receiver: &Value, args: &[Value]) -> Result<Value, JsError> {
        function.call(receiver, args)
    }

    /// Instantiates `function` with `new`.
    fn construct(&self, function: &Value, args: &[Value], env: &Value) -> Result<Value, JsError> {
        let _ = env;
        function.construct(args)
    }
}

/// Handler that overrides nothing: plain native behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHandler;

impl Handler for NativeHandler {}
