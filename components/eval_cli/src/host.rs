//! Demo host environment
//!
//! A handful of host objects so the CLI has something to call: `Math`,
//! `JSON`, `String.raw`, `Object.keys`/`Object.values` and `console.log`.
//! Everything is a plain native function; nothing here can reach outside
//! the process except `console.log` writing to stdout.

use core_types::{ErrorKind, JsError, Value};

/// Builds a fresh environment holding the demo host objects.
///
/// # Example
///
/// ```
/// use eval_cli::host::environment;
/// use interpreter::{evaluate_blocking, NativeHandler};
///
/// let env = environment();
/// let result = evaluate_blocking("Math.max(1, 3, 2)", &env, &NativeHandler).unwrap();
/// assert_eq!(result, core_types::Value::Number(3.0));
/// ```
pub fn environment() -> Value {
    Value::object([
        ("Math", math()),
        ("JSON", json()),
        ("String", Value::object([("raw", Value::function("raw", string_raw))])),
        ("Object", object()),
        ("console", Value::object([("log", Value::function("log", console_log))])),
    ])
}

fn math() -> Value {
    fn unary(name: &str, f: fn(f64) -> f64) -> (String, Value) {
        let function = Value::function(name, move |_, args| Ok(Value::Number(f(number_arg(args, 0)))));
        (name.to_string(), function)
    }

    let mut entries = vec![
        ("PI".to_string(), Value::Number(std::f64::consts::PI)),
        ("E".to_string(), Value::Number(std::f64::consts::E)),
        (
            "max".to_string(),
            Value::function("max", |_, args| {
                Ok(Value::Number(args.iter().map(Value::to_number).fold(f64::NEG_INFINITY, js_max)))
            }),
        ),
        (
            "min".to_string(),
            Value::function("min", |_, args| {
                Ok(Value::Number(args.iter().map(Value::to_number).fold(f64::INFINITY, js_min)))
            }),
        ),
        (
            "pow".to_string(),
            Value::function("pow", |_, args| {
                Ok(Value::Number(number_arg(args, 0).powf(number_arg(args, 1))))
            }),
        ),
    ];
    entries.extend([
        unary("abs", f64::abs),
        unary("floor", f64::floor),
        unary("ceil", f64::ceil),
        unary("sqrt", f64::sqrt),
        unary("trunc", f64::trunc),
        unary("round", |x| (x + 0.5).floor()),
    ]);
    Value::object(entries)
}

fn json() -> Value {
    Value::object([
        (
            "stringify",
            Value::function("stringify", |_, args| {
                let value = args.first().cloned().unwrap_or(Value::Undefined);
                if matches!(value, Value::Undefined | Value::Function(_)) {
                    return Ok(Value::Undefined);
                }
                let text = serde_json::to_string(&value.to_json())
                    .map_err(|e| JsError::type_error(e.to_string()))?;
                Ok(Value::String(text))
            }),
        ),
        (
            "parse",
            Value::function("parse", |_, args| {
                let text = args.first().map(|v| v.to_string()).unwrap_or_default();
                let json: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| JsError::new(ErrorKind::SyntaxError, e.to_string()))?;
                Ok(Value::from_json(&json))
            }),
        ),
    ])
}

fn object() -> Value {
    Value::object([
        (
            "keys",
            Value::function("keys", |_, args| {
                Ok(Value::array(entries(args.first())?.into_iter().map(|(k, _)| Value::String(k)).collect()))
            }),
        ),
        (
            "values",
            Value::function("values", |_, args| {
                Ok(Value::array(entries(args.first())?.into_iter().map(|(_, v)| v).collect()))
            }),
        ),
    ])
}

/// Own enumerable entries of an object or array
fn entries(target: Option<&Value>) -> Result<Vec<(String, Value)>, JsError> {
    match target {
        Some(Value::Object(obj)) => Ok(obj
            .borrow()
            .properties
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()),
        Some(Value::Array(arr)) => Ok(arr
            .borrow()
            .elements
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect()),
        Some(Value::Undefined | Value::Null) | None => Err(JsError::type_error(
            "Cannot convert undefined or null to object",
        )),
        Some(_) => Ok(Vec::new()),
    }
}

/// Tag function joining raw template segments with the interpolated values
fn string_raw(_this: &Value, args: &[Value]) -> Result<Value, JsError> {
    let strings = args.first().cloned().unwrap_or(Value::Undefined);
    let raw = strings.get_property("raw")?;
    let len = raw.get_property("length")?.to_number();
    let len = if len.is_finite() && len > 0.0 { len as usize } else { 0 };

    let mut out = String::new();
    for i in 0..len {
        out.push_str(&raw.get_property(&i.to_string())?.to_string());
        if i + 1 < len {
            if let Some(value) = args.get(i + 1) {
                out.push_str(&value.to_string());
            }
        }
    }
    Ok(Value::String(out))
}

fn console_log(_this: &Value, args: &[Value]) -> Result<Value, JsError> {
    let line: Vec<String> = args.iter().map(Value::to_string).collect();
    println!("{}", line.join(" "));
    Ok(Value::Undefined)
}

fn number_arg(args: &[Value], index: usize) -> f64 {
    args.get(index).map(Value::to_number).unwrap_or(f64::NAN)
}

fn js_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn js_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}
