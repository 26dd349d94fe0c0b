//! Unit tests for interpreter
//!
//! Error paths and the less common operators, one behaviour per test.

use core_types::{ErrorKind, JsError, JsFunction, Value};
use interpreter::{evaluate_blocking, NativeHandler, Vm};

fn run(source: &str, env: &Value) -> Result<Value, JsError> {
    evaluate_blocking(source, env, &NativeHandler)
}

fn point() -> Value {
    Value::Function(JsFunction::constructor("Point", |this, args| {
        this.set_property("x", args.first().cloned().unwrap_or(Value::Undefined))?;
        this.set_property("y", args.get(1).cloned().unwrap_or(Value::Undefined))?;
        Ok(Value::Undefined)
    }))
}

#[test]
fn test_reading_property_of_null() {
    let env = Value::object([("a", Value::object([("b", Value::Null)]))]);
    let err = run("a.b.c", &env).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "Cannot read properties of null (reading 'c')");
}

#[test]
fn test_writing_property_of_undefined() {
    let err = run("a.b = 1", &Value::empty_object()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "Cannot set properties of undefined (setting 'b')");
}

#[test]
fn test_calling_missing_function() {
    let err = run("f(1)", &Value::empty_object()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "f is not a function");

    let env = Value::object([("o", Value::empty_object())]);
    let err = run("o.m()", &env).unwrap_err();
    assert_eq!(err.message, "m is not a function");
}

#[test]
fn test_calling_non_function_value() {
    let env = Value::object([("n", Value::Number(3.0))]);
    let err = run("n()", &env).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "3 is not a function");
}

#[test]
fn test_constructing_missing_and_plain_functions() {
    let err = run("new Missing()", &Value::empty_object()).unwrap_err();
    assert_eq!(err.message, "Missing is not a constructor");

    let env = Value::object([("f", Value::function("f", |_, _| Ok(Value::Null)))]);
    let err = run("new f()", &env).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
}

#[test]
fn test_assignment_to_call_result() {
    let env = Value::object([("f", Value::function("f", |_, _| Ok(Value::Null)))]);
    let err = run("f() = 1", &env).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReferenceError);
    assert_eq!(err.message, "Invalid left-hand side in assignment");
}

#[test]
fn test_assignment_to_literal_is_a_syntax_error() {
    let err = run("1 = 2", &Value::empty_object()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
}

#[test]
fn test_assignment_through_skipped_chain() {
    let env = Value::object([("a", Value::Null)]);
    assert!(run("a?.b = 1", &env).is_err());
}

#[test]
fn test_huge_array_index_is_a_range_error() {
    let vm = Vm::new();
    let err = vm.eval_blocking("a = []; a[4294967294] = 1; 'survived'").unwrap_err();
    assert_eq!(err.kind, ErrorKind::RangeError);
    assert_eq!(vm.eval_blocking("a.length").unwrap(), Value::Number(0.0));

    let err = vm.eval_blocking("[].length = 4294967295").unwrap_err();
    assert_eq!(err.kind, ErrorKind::RangeError);
    assert_eq!(vm.eval_blocking("a[3] = 1; a.length").unwrap(), Value::Number(4.0));
}

#[test]
fn test_spreading_a_number() {
    let err = run("[...5]", &Value::empty_object()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "5 is not iterable");
}

#[test]
fn test_spreading_a_string() {
    let result = run("[...'abc']", &Value::empty_object()).unwrap();
    assert_eq!(result.to_string(), "a,b,c");
}

#[test]
fn test_object_spread_of_array_and_primitives() {
    let result = run("({...[7, 8], ...null, ...1})", &Value::empty_object()).unwrap();
    assert_eq!(result.get_property("0").unwrap(), Value::Number(7.0));
    assert_eq!(result.get_property("1").unwrap(), Value::Number(8.0));
}

#[test]
fn test_optional_chain_does_not_evaluate_arguments() {
    let env = Value::object([("a", Value::Null)]);
    // `x` is undefined; reading `x.y` would fail if the chain did not stop
    assert_eq!(run("a?.m(x.y)", &env).unwrap(), Value::Undefined);
    assert_eq!(run("a?.b[x.y]", &env).unwrap(), Value::Undefined);
    // `boom` is missing; calling it would raise a TypeError
    assert_eq!(run("a?.m(boom())", &env).unwrap(), Value::Undefined);
    assert_eq!(run("a?.b[boom()].c(boom())", &env).unwrap(), Value::Undefined);
}

#[test]
fn test_parenthesized_optional_chain_ends_the_skip() {
    let env = Value::object([("a", Value::Null)]);
    let err = run("(a?.b).c", &env).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "Cannot read properties of undefined (reading 'c')");
    assert_eq!(run("typeof a?.b.c", &env).unwrap(), Value::from("undefined"));
}

#[test]
fn test_optional_chain_on_present_receiver() {
    let env = Value::object([("a", Value::object([("b", Value::Number(2.0))]))]);
    assert_eq!(run("a?.b", &env).unwrap(), Value::Number(2.0));
    assert_eq!(run("a?.c?.d", &env).unwrap(), Value::Undefined);
}

#[test]
fn test_construct_and_instanceof() {
    let env = Value::object([("Point", point())]);
    let result = run("p = new Point(1, 2); p.x + p.y", &env).unwrap();
    assert_eq!(result, Value::Number(3.0));
    assert_eq!(run("p instanceof Point", &env).unwrap(), Value::Boolean(true));
    assert_eq!(run("({}) instanceof Point", &env).unwrap(), Value::Boolean(false));
}

#[test]
fn test_construct_without_arguments() {
    let env = Value::object([("Point", point())]);
    let result = run("typeof (new Point).x", &env).unwrap();
    assert_eq!(result, Value::from("undefined"));
}

#[test]
fn test_method_call_receives_this() {
    let env = Value::object([(
        "counter",
        Value::object([
            ("n", Value::Number(41.0)),
            (
                "next",
                Value::function("next", |this, _| {
                    let n = this.get_property("n")?.to_number() + 1.0;
                    this.set_property("n", Value::Number(n))?;
                    Ok(Value::Number(n))
                }),
            ),
        ]),
    )]);
    assert_eq!(run("counter.next()", &env).unwrap(), Value::Number(42.0));
    assert_eq!(run("counter['next']()", &env).unwrap(), Value::Number(43.0));
}

#[test]
fn test_delete() {
    let env = Value::object([("o", Value::object([("k", Value::Number(1.0))]))]);
    assert_eq!(run("delete o.k", &env).unwrap(), Value::Boolean(true));
    assert_eq!(run("o.k", &env).unwrap(), Value::Undefined);
    assert_eq!(run("delete 1", &env).unwrap(), Value::Boolean(true));
}

#[test]
fn test_void() {
    let env = Value::object([("a", Value::Number(1.0))]);
    assert_eq!(run("void (a = 2)", &env).unwrap(), Value::Undefined);
    assert_eq!(env.get_property("a").unwrap(), Value::Number(2.0));
}

#[test]
fn test_index_assignment() {
    let env = Value::object([("arr", Value::array(vec![Value::Number(0.0)]))]);
    run("arr[0] = 5; arr[2] = 7", &env).unwrap();
    assert_eq!(run("arr", &env).unwrap().to_string(), "5,,7");
    assert_eq!(run("arr.length", &env).unwrap(), Value::Number(3.0));
}

#[test]
fn test_tagged_template_with_custom_tag() {
    let env = Value::object([(
        "tag",
        Value::function("tag", |_, args| {
            let strings = args.first().cloned().unwrap_or(Value::Undefined);
            let raw = strings.get_property("raw")?;
            Ok(Value::array(vec![
                strings.get_property("length")?,
                raw.get_property("0")?,
                args.get(1).cloned().unwrap_or(Value::Undefined),
                Value::Number((args.len() - 1) as f64),
            ]))
        }),
    )]);
    let result = run("tag`x ${1 + 1} y ${3}`", &env).unwrap();
    assert_eq!(result.to_string(), "3,x ,2,2");
}

#[test]
fn test_unary_operators() {
    let env = Value::empty_object();
    assert_eq!(run("!0", &env).unwrap(), Value::Boolean(true));
    assert_eq!(run("~5", &env).unwrap(), Value::Number(-6.0));
    assert_eq!(run("+'42'", &env).unwrap(), Value::Number(42.0));
    assert_eq!(run("typeof typeof 1", &env).unwrap(), Value::from("string"));
}

#[test]
fn test_prefix_update_of_literal_is_rejected() {
    let err = run("++1", &Value::empty_object()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
    assert!(err.message.contains("prefix operation"));
}

#[test]
fn test_syntax_error_has_position() {
    let err = run("(1 + 2", &Value::empty_object()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
    assert!(err.source_position.is_some());
}

#[test]
fn test_host_error_propagates_unchanged() {
    let env = Value::object([(
        "fail",
        Value::function("fail", |_, _| Err(JsError::range("out of range"))),
    )]);
    let err = run("1 + fail()", &env).unwrap_err();
    assert_eq!(err.kind, ErrorKind::RangeError);
    assert_eq!(err.message, "out of range");
}

#[test]
fn test_vm_with_environment() {
    let env = Value::object([("base", Value::Number(10.0))]);
    let vm = Vm::new().with_environment(env.clone());
    vm.eval_blocking("total = base * 3").unwrap();
    assert_eq!(env.get_property("total").unwrap(), Value::Number(30.0));
}
