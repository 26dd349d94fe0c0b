//! Type coercions and comparison algorithms.

use crate::{format_number, Value};

impl Value {
    /// Converts a reference type to a primitive. Primitives are returned as-is.
    pub fn to_primitive(&self) -> Value {
        match self {
            Value::Array(_)
            | Value::Object(_)
            | Value::Function(_)
            | Value::RegExp(_)
            | Value::Deferred(_) => Value::String(self.to_string()),
            other => other.clone(),
        }
    }

    /// Converts the value to a number.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) | Value::Object(_) => self.to_primitive().to_number(),
            Value::Function(_) | Value::RegExp(_) | Value::Deferred(_) => f64::NAN,
        }
    }

    /// Converts the value to its string form.
    pub fn to_js_string(&self) -> String {
        self.to_string()
    }

    /// Converts the value to a property key.
    pub fn to_property_key(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            other => other.to_primitive().to_string(),
        }
    }

    /// ToInt32: wraps the number modulo 2^32 into the signed range.
    pub fn to_int32(&self) -> i32 {
        self.to_uint32() as i32
    }

    /// ToUint32: wraps the number modulo 2^32.
    pub fn to_uint32(&self) -> u32 {
        let n = self.to_number();
        if !n.is_finite() || n == 0.0 {
            return 0;
        }
        let modulus = 4_294_967_296.0_f64;
        let wrapped = n.trunc().rem_euclid(modulus);
        wrapped as u32
    }

    /// Strict equality (`===`).
    pub fn strict_equals(&self, other: &Value) -> bool {
        self == other
    }

    /// Loose equality (`==`).
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Boolean(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Boolean(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (a, b) if is_reference(a) && !is_reference(b) => a.to_primitive().loose_equals(b),
            (a, b) if !is_reference(a) && is_reference(b) => a.loose_equals(&b.to_primitive()),
            _ => self.strict_equals(other),
        }
    }

    /// Abstract relational comparison `self < other`.
    ///
    /// Returns `None` when either side converts to `NaN`.
    pub fn less_than(&self, other: &Value) -> Option<bool> {
        let a = self.to_primitive();
        let b = other.to_primitive();
        if let (Value::String(x), Value::String(y)) = (&a, &b) {
            return Some(x.encode_utf16().lt(y.encode_utf16()));
        }
        let x = a.to_number();
        let y = b.to_number();
        if x.is_nan() || y.is_nan() {
            None
        } else {
            Some(x < y)
        }
    }

    /// Renders the value as JSON. Functions and `undefined` become `null`
    /// inside arrays and are omitted from objects.
    pub fn to_json(&self) -> serde_json::Value {
        json_of(self, &mut Vec::new())
    }

    /// Builds a value from parsed JSON.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => {
                Value::object(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }
}

fn is_reference(value: &Value) -> bool {
    matches!(
        value,
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::RegExp(_) | Value::Deferred(_)
    )
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf" and "nan", which are not numeric literals here.
    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !valid {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn json_of(value: &Value, seen: &mut Vec<usize>) -> serde_json::Value {
    match value {
        Value::Undefined | Value::Null | Value::Function(_) | Value::Deferred(_) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::RegExp(_) => serde_json::Value::Object(serde_json::Map::new()),
        Value::Array(arr) => {
            let id = std::rc::Rc::as_ptr(arr) as usize;
            if seen.contains(&id) {
                return serde_json::Value::Null;
            }
            seen.push(id);
            let items = arr.borrow().elements.iter().map(|v| json_of(v, seen)).collect();
            seen.pop();
            serde_json::Value::Array(items)
        }
        Value::Object(obj) => {
            let id = std::rc::Rc::as_ptr(obj) as usize;
            if seen.contains(&id) {
                return serde_json::Value::Null;
            }
            seen.push(id);
            let mut map = serde_json::Map::new();
            for (key, v) in obj.borrow().properties.iter() {
                if matches!(v, Value::Undefined | Value::Function(_)) {
                    continue;
                }
                map.insert(key.to_string(), json_of(v, seen));
            }
            seen.pop();
            serde_json::Value::Object(map)
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
