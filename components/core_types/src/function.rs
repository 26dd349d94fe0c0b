//! Host function values.

use std::fmt;
use std::rc::Rc;

use crate::{JsError, Value};

/// Signature of a host-provided function: receives `this` and the arguments.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> Result<Value, JsError>;

/// A callable and/or constructible host function.
///
/// Cloning is cheap and clones share identity, which is what `instanceof`
/// compares.
///
/// # Examples
///
/// ```
/// use core_types::{JsFunction, Value};
///
/// let double = JsFunction::native("double", |_this, args| {
///     Ok(Value::Number(args.first().map(|v| v.to_number()).unwrap_or(f64::NAN) * 2.0))
/// });
///
/// let result = double.call(&Value::Undefined, &[Value::Number(21.0)]).unwrap();
/// assert_eq!(result, Value::Number(42.0));
/// ```
#[derive(Clone)]
pub struct JsFunction(Rc<FunctionData>);

struct FunctionData {
    name: String,
    call: Option<Rc<NativeFn>>,
    construct: Option<Rc<NativeFn>>,
}

impl JsFunction {
    /// Creates a plain callable function.
    pub fn native<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        JsFunction(Rc::new(FunctionData {
            name: name.into(),
            call: Some(Rc::new(call)),
            construct: None,
        }))
    }

    /// Creates a constructor. `init` receives the fresh instance as `this`;
    /// if it returns an object or array that value replaces the instance.
    pub fn constructor<F>(name: impl Into<String>, init: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        JsFunction(Rc::new(FunctionData {
            name: name.into(),
            call: None,
            construct: Some(Rc::new(init)),
        }))
    }

    /// Creates a function usable both as a call target and a constructor.
    pub fn with_construct<F, G>(name: impl Into<String>, call: F, init: G) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
        G: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        JsFunction(Rc::new(FunctionData {
            name: name.into(),
            call: Some(Rc::new(call)),
            construct: Some(Rc::new(init)),
        }))
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns true if the function can be invoked with `new`.
    pub fn is_constructor(&self) -> bool {
        self.0.construct.is_some()
    }

    /// Invokes the function.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, JsError> {
        match &self.0.call {
            Some(call) => call(this, args),
            None => Err(JsError::type_error(format!(
                "Class constructor {} cannot be invoked without 'new'",
                self.0.name
            ))),
        }
    }

    /// Runs the constructor body against a prepared instance.
    pub(crate) fn init(&self, this: &Value, args: &[Value]) -> Result<Value, JsError> {
        match &self.0.construct {
            Some(init) => init(this, args),
            None => Err(JsError::type_error(format!(
                "{} is not a constructor",
                self.0.name
            ))),
        }
    }

    /// Returns true if both handles refer to the same function.
    pub fn ptr_eq(&self, other: &JsFunction) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.0.name)
    }
}
