//! Contract compliance tests for core_types
//!
//! These tests pin down the public surface other crates rely on.

use core_types::{Deferred, ErrorKind, JsError, SourcePosition, Value};

#[cfg(test)]
mod value_contract_tests {
    use super::*;

    /// Contract: Value enum must have all specified variants
    #[test]
    fn test_value_variants() {
        let values = vec![
            Value::Undefined,
            Value::Null,
            Value::Boolean(true),
            Value::Number(1.5),
            Value::String("s".to_string()),
            Value::array(vec![]),
            Value::empty_object(),
            Value::function("f", |_, _| Ok(Value::Undefined)),
            Value::Deferred(Deferred::resolved(Value::Null)),
        ];
        assert_eq!(values.len(), 9);
    }

    /// Contract: arrays and objects are shared by reference
    #[test]
    fn test_reference_sharing() {
        let obj = Value::empty_object();
        let alias = obj.clone();
        alias.set_property("k", Value::Number(1.0)).unwrap();
        assert_eq!(obj.get_property("k").unwrap(), Value::Number(1.0));
    }

    /// Contract: objects keep key insertion order
    #[test]
    fn test_object_key_order() {
        let obj = Value::object([("z", Value::Null), ("a", Value::Null)]);
        obj.set_property("m", Value::Null).unwrap();
        if let Value::Object(inner) = &obj {
            let keys: Vec<String> = inner.borrow().properties.keys().map(String::from).collect();
            assert_eq!(keys, vec!["z", "a", "m"]);
        } else {
            panic!("expected object");
        }
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    /// Contract: JsError exposes kind, message and source_position
    #[test]
    fn test_error_fields() {
        let error = JsError {
            kind: ErrorKind::RangeError,
            message: "Invalid array length".to_string(),
            source_position: Some(SourcePosition::new(1, 1, 0)),
        };
        assert_eq!(error.kind, ErrorKind::RangeError);
        assert_eq!(error.message, "Invalid array length");
    }
}
