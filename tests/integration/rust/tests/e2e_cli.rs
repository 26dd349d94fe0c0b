//! End-to-End CLI Integration Tests
//!
//! Tests the complete evaluator through the eval_cli Runtime API.
//! This is the highest level integration test - source code to final result.

use core_types::Value;
use eval_cli::Runtime;

/// Test: Simple number execution
#[test]
fn test_e2e_simple_number() {
    let runtime = Runtime::new();
    let result = runtime.execute_string("42").expect("Execution failed");
    assert_eq!(result, Value::Number(42.0));
}

/// Test: Computed keys and JSON output
#[test]
fn test_e2e_json_stringify_computed_key() {
    let runtime = Runtime::new();
    let result = runtime
        .execute_string("JSON.stringify({[2*2 + '.']: 3e-1})")
        .expect("Execution failed");
    assert_eq!(runtime.render(&result), "'{\"4.\":0.3}'");
}

/// Test: Spread into a host function
#[test]
fn test_e2e_math_with_spread() {
    let runtime = Runtime::new();
    let result = runtime
        .execute_string("nums = [2.1, 3.4, -5]; Math.max(...nums) + Math.min(...nums)")
        .expect("Execution failed");
    assert_eq!(result, Value::Number(-1.6));
}

/// Test: Bindings persist across evaluations
#[test]
fn test_e2e_session_state() {
    let runtime = Runtime::new();
    runtime.execute_string("count = 0").unwrap();
    for _ in 0..3 {
        runtime.execute_string("count++").unwrap();
    }
    assert_eq!(runtime.execute_string("count").unwrap(), Value::Number(3.0));
}

/// Test: Object keys through the host and spread
#[test]
fn test_e2e_object_keys_spread() {
    let runtime = Runtime::new().with_json(true);
    let result = runtime
        .execute_string("a = {k2: 'v2', k3: 'v3'}; ['k1', ...Object.keys(a), 'k4']")
        .unwrap();
    assert_eq!(runtime.render(&result), "[\"k1\",\"k2\",\"k3\",\"k4\"]");
}

/// Test: Errors carry their kind into the message
#[test]
fn test_e2e_errors() {
    let runtime = Runtime::new();
    let err = runtime.execute_string("Math.nope()").unwrap_err();
    assert_eq!(err.to_string(), "TypeError: nope is not a function");

    let err = runtime.execute_string("1 +").unwrap_err();
    assert!(err.to_string().starts_with("SyntaxError"));
}

/// Test: Disassembly of a compiled expression
#[test]
fn test_e2e_disassemble() {
    let runtime = Runtime::new();
    assert_eq!(
        runtime.disassemble("f(...xs)").unwrap(),
        "NAME f\nNAME xs\nSPREAD\nCALL 1\n"
    );
}
