//! Runtime value representation and the native property operations.
//!
//! This module provides the core `Value` enum. Primitive values are stored
//! inline; arrays and objects are shared mutable references so that writes
//! made through one handle are visible through every other.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Deferred, JsArray, JsError, JsFunction, JsObject, JsRegExp, PropertyMap};

/// Largest length an array may grow to through an index or `length` write.
///
/// Arrays are dense, so a single write past the end allocates every slot
/// before it.
pub const MAX_ARRAY_LENGTH: usize = 1 << 20;

/// Represents any runtime value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let list = Value::array(vec![Value::Number(1.0), Value::from("two")]);
///
/// assert_eq!(list.get_property("length").unwrap(), Value::Number(2.0));
/// assert_eq!(list.to_string(), "1,two");
/// assert_eq!(list.type_of(), "object");
/// ```
#[derive(Clone)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// Boolean (true or false)
    Boolean(bool),
    /// IEEE 754 double-precision number
    Number(f64),
    /// String value
    String(String),
    /// Shared array
    Array(Rc<RefCell<JsArray>>),
    /// Shared associative object
    Object(Rc<RefCell<JsObject>>),
    /// Host function
    Function(JsFunction),
    /// Regular expression
    RegExp(Rc<JsRegExp>),
    /// Pending asynchronous result
    Deferred(Deferred),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(arr) => write!(f, "Array(len={})", arr.borrow().elements.len()),
            Value::Object(obj) => {
                let keys: Vec<String> = obj.borrow().properties.keys().map(String::from).collect();
                f.debug_tuple("Object").field(&keys).finish()
            }
            Value::Function(func) => f.debug_tuple("Function").field(&func.name()).finish(),
            Value::RegExp(re) => write!(f, "RegExp(/{}/{})", re.source(), re.flags()),
            Value::Deferred(_) => write!(f, "Deferred"),
        }
    }
}

impl PartialEq for Value {
    /// Identity comparison: numbers compare by IEEE equality (so `NaN` is
    /// never equal to itself) and reference types by pointer.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::RegExp(a), Value::RegExp(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<JsFunction> for Value {
    fn from(f: JsFunction) -> Self {
        Value::Function(f)
    }
}

impl Value {
    /// Creates a new array value.
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(JsArray::from_elements(elements))))
    }

    /// Creates a new object value from key/value pairs.
    pub fn object<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let properties: PropertyMap = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Rc::new(RefCell::new(JsObject::from_properties(properties))))
    }

    /// Creates an empty object value.
    pub fn empty_object() -> Value {
        Value::Object(Rc::new(RefCell::new(JsObject::new())))
    }

    /// Wraps a native closure as a function value.
    pub fn function<F>(name: &str, call: F) -> Value
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        Value::Function(JsFunction::native(name, call))
    }

    /// Returns true for `null` and `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Returns true if the value can be invoked.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Checks if the value is truthy.
    ///
    /// Falsy values: `undefined`, `null`, `false`, `0`, `-0`, `NaN` and the
    /// empty string. Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Returns the `typeof` string of the value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::RegExp(_) | Value::Deferred(_) => {
                "object"
            }
        }
    }

    /// Reads a property using the native object model.
    ///
    /// Reading from `null` or `undefined` is a `TypeError` naming the key.
    pub fn get_property(&self, key: &str) -> Result<Value, JsError> {
        let value = match self {
            Value::Undefined | Value::Null => {
                return Err(JsError::type_error(format!(
                    "Cannot read properties of {} (reading '{}')",
                    self, key
                )))
            }
            Value::Object(obj) => obj.borrow().properties.get(key).cloned().unwrap_or(Value::Undefined),
            Value::Array(arr) => {
                let arr = arr.borrow();
                if key == "length" {
                    Value::Number(arr.elements.len() as f64)
                } else if let Some(index) = array_index(key) {
                    arr.elements.get(index).cloned().unwrap_or(Value::Undefined)
                } else {
                    arr.properties.get(key).cloned().unwrap_or(Value::Undefined)
                }
            }
            Value::String(s) => {
                if key == "length" {
                    Value::Number(s.encode_utf16().count() as f64)
                } else if let Some(index) = array_index(key) {
                    s.encode_utf16()
                        .nth(index)
                        .map(|unit| Value::String(String::from_utf16_lossy(&[unit])))
                        .unwrap_or(Value::Undefined)
                } else {
                    Value::Undefined
                }
            }
            Value::Function(func) => match key {
                "name" => Value::String(func.name().to_string()),
                _ => Value::Undefined,
            },
            Value::RegExp(re) => match key {
                "source" => Value::String(re.source().to_string()),
                "flags" => Value::String(re.flags().to_string()),
                "lastIndex" => Value::Number(0.0),
                "test" => {
                    let re = Rc::clone(re);
                    Value::function("test", move |_this, args| {
                        let text = args.first().map(|v| v.to_string()).unwrap_or_else(|| "undefined".to_string());
                        Ok(Value::Boolean(re.test(&text)))
                    })
                }
                _ => Value::Undefined,
            },
            Value::Boolean(_) | Value::Number(_) | Value::Deferred(_) => Value::Undefined,
        };
        Ok(value)
    }

    /// Writes a property using the native object model.
    pub fn set_property(&self, key: &str, value: Value) -> Result<(), JsError> {
        match self {
            Value::Undefined | Value::Null => Err(JsError::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                self, key
            ))),
            Value::Object(obj) => {
                obj.borrow_mut().properties.insert(key, value);
                Ok(())
            }
            Value::Array(arr) => {
                let mut arr = arr.borrow_mut();
                if key == "length" {
                    let len = value.to_number();
                    if len < 0.0 || len.fract() != 0.0 || len > u32::MAX as f64 {
                        return Err(JsError::range("Invalid array length"));
                    }
                    let len = len as usize;
                    if len > MAX_ARRAY_LENGTH {
                        return Err(length_limit(len));
                    }
                    arr.elements.resize(len, Value::Undefined);
                } else if let Some(index) = array_index(key) {
                    if index >= arr.elements.len() {
                        if index >= MAX_ARRAY_LENGTH {
                            return Err(length_limit(index.saturating_add(1)));
                        }
                        arr.elements.resize(index + 1, Value::Undefined);
                    }
                    arr.elements[index] = value;
                } else {
                    arr.properties.insert(key, value);
                }
                Ok(())
            }
            other => Err(JsError::type_error(format!(
                "Cannot create property '{}' on {} '{}'",
                key,
                other.type_of(),
                other
            ))),
        }
    }

    /// Removes a property using the native object model.
    pub fn delete_property(&self, key: &str) -> Result<bool, JsError> {
        match self {
            Value::Undefined | Value::Null => Err(JsError::type_error(format!(
                "Cannot convert undefined or null to object (deleting '{}')",
                key
            ))),
            Value::Object(obj) => {
                obj.borrow_mut().properties.remove(key);
                Ok(true)
            }
            Value::Array(arr) => {
                let mut arr = arr.borrow_mut();
                if let Some(index) = array_index(key) {
                    if let Some(slot) = arr.elements.get_mut(index) {
                        *slot = Value::Undefined;
                    }
                } else if key != "length" {
                    arr.properties.remove(key);
                } else {
                    return Ok(false);
                }
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    /// Calls the value as a function.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, JsError> {
        match self {
            Value::Function(func) => func.call(this, args),
            other => Err(JsError::type_error(format!("{} is not a function", other))),
        }
    }

    /// Instantiates the value as a constructor.
    ///
    /// The fresh instance remembers its constructor for `instanceof`. If the
    /// constructor body returns an object or array, that value is the result.
    pub fn construct(&self, args: &[Value]) -> Result<Value, JsError> {
        match self {
            Value::Function(func) if func.is_constructor() => {
                let instance = Value::Object(Rc::new(RefCell::new(JsObject {
                    properties: PropertyMap::new(),
                    constructor: Some(func.clone()),
                })));
                match func.init(&instance, args)? {
                    result @ (Value::Object(_) | Value::Array(_)) => Ok(result),
                    _ => Ok(instance),
                }
            }
            other => Err(JsError::type_error(format!("{} is not a constructor", other))),
        }
    }

    /// The `in` operator: does `self` (an object or array) hold `key`?
    pub fn has_property(&self, key: &str) -> Result<bool, JsError> {
        match self {
            Value::Object(obj) => Ok(obj.borrow().properties.contains_key(key)),
            Value::Array(arr) => {
                let arr = arr.borrow();
                Ok(key == "length"
                    || array_index(key).map_or(false, |i| i < arr.elements.len())
                    || arr.properties.contains_key(key))
            }
            Value::Function(_) => Ok(key == "name"),
            other => Err(JsError::type_error(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                key, other
            ))),
        }
    }

    /// The `instanceof` operator: was `self` constructed by `constructor`?
    pub fn instance_of(&self, constructor: &Value) -> Result<bool, JsError> {
        let ctor = match constructor {
            Value::Function(func) => func,
            _ => {
                return Err(JsError::type_error(
                    "Right-hand side of 'instanceof' is not callable",
                ))
            }
        };
        match self {
            Value::Object(obj) => Ok(obj
                .borrow()
                .constructor
                .as_ref()
                .map_or(false, |c| c.ptr_eq(ctor))),
            _ => Ok(false),
        }
    }
}

/// Parses a canonical array index ("0", "17", but not "01" or "1.0").
fn length_limit(len: usize) -> JsError {
    JsError::range(format!(
        "Array length {} exceeds the limit of {}",
        len, MAX_ARRAY_LENGTH
    ))
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Converts to the string form used by `String(value)` and concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&crate::format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(_) => f.write_str(&join_array(self, &mut Vec::new())),
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function(func) => write!(f, "function {}() {{ [native code] }}", func.name()),
            Value::RegExp(re) => write!(f, "/{}/{}", re.source(), re.flags()),
            Value::Deferred(_) => f.write_str("[object Promise]"),
        }
    }
}

/// Joins array elements with `,`; arrays already being joined render empty.
fn join_array(value: &Value, seen: &mut Vec<*const RefCell<JsArray>>) -> String {
    let arr = match value {
        Value::Array(arr) => arr,
        other => return other.to_string(),
    };
    let ptr = Rc::as_ptr(arr);
    if seen.contains(&ptr) {
        return String::new();
    }
    seen.push(ptr);
    let parts: Vec<String> = arr
        .borrow()
        .elements
        .iter()
        .map(|element| match element {
            Value::Undefined | Value::Null => String::new(),
            nested @ Value::Array(_) => join_array(nested, seen),
            other => other.to_string(),
        })
        .collect();
    seen.pop();
    parts.join(",")
}
