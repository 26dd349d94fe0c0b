//! Unit tests for Value coercions and comparisons

use core_types::Value;

#[cfg(test)]
mod truthiness_tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(-0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
    }

    #[test]
    fn test_reference_values_are_truthy() {
        assert!(Value::array(vec![]).is_truthy());
        assert!(Value::empty_object().is_truthy());
        assert!(Value::function("f", |_, _| Ok(Value::Undefined)).is_truthy());
    }
}

#[cfg(test)]
mod type_of_tests {
    use super::*;

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of(), "undefined");
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Boolean(true).type_of(), "boolean");
        assert_eq!(Value::Number(1.0).type_of(), "number");
        assert_eq!(Value::from("s").type_of(), "string");
        assert_eq!(Value::array(vec![]).type_of(), "object");
        assert_eq!(Value::function("f", |_, _| Ok(Value::Null)).type_of(), "function");
    }
}

#[cfg(test)]
mod to_string_tests {
    use super::*;

    #[test]
    fn test_primitive_strings() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn test_array_join_skips_nullish() {
        let arr = Value::array(vec![
            Value::Number(1.0),
            Value::Null,
            Value::array(vec![Value::from("a"), Value::from("b")]),
        ]);
        assert_eq!(arr.to_string(), "1,,a,b");
    }

    #[test]
    fn test_object_string() {
        assert_eq!(Value::empty_object().to_string(), "[object Object]");
    }
}

#[cfg(test)]
mod to_number_tests {
    use super::*;

    #[test]
    fn test_to_number() {
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Boolean(true).to_number(), 1.0);
        assert_eq!(Value::from("3.5e2").to_number(), 350.0);
        assert_eq!(Value::from(".5").to_number(), 0.5);
        assert_eq!(Value::array(vec![]).to_number(), 0.0);
        assert_eq!(Value::array(vec![Value::Number(7.0)]).to_number(), 7.0);
        assert!(Value::empty_object().to_number().is_nan());
    }
}

#[cfg(test)]
mod equality_tests {
    use super::*;

    #[test]
    fn test_strict_equality() {
        assert!(Value::Number(1.0).strict_equals(&Value::Number(1.0)));
        assert!(!Value::Number(1.0).strict_equals(&Value::from("1")));
        assert!(!Value::Null.strict_equals(&Value::Undefined));

        let obj = Value::empty_object();
        assert!(obj.strict_equals(&obj.clone()));
        assert!(!obj.strict_equals(&Value::empty_object()));
    }

    #[test]
    fn test_loose_equality_with_coercion() {
        assert!(Value::from("0").loose_equals(&Value::Boolean(false)));
        assert!(!Value::Undefined.loose_equals(&Value::Boolean(false)));
        assert!(!Value::Number(f64::NAN).loose_equals(&Value::Number(f64::NAN)));
    }
}
