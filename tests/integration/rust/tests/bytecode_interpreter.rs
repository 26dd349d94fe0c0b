//! Bytecode to Interpreter Integration Tests
//!
//! Compiled programs are reusable values: compile once, persist, reload and
//! run against different environments.

use bytecode_system::{Bytecode, Constant, Opcode};
use core_types::{ErrorKind, Value};
use interpreter::{evaluate_blocking, Dispatcher, NativeHandler};

/// Test: one program, many environments
#[test]
fn test_compiled_program_reused_across_environments() {
    let bytecode = parser::compile("price * (1 + rate)").unwrap();
    for (price, rate, expected) in [(100.0, 0.5, 150.0), (8.0, 0.25, 10.0)] {
        let env = Value::object([("price", Value::Number(price)), ("rate", Value::Number(rate))]);
        let result = evaluate_blocking(&bytecode, &env, &NativeHandler).unwrap();
        assert_eq!(result, Value::Number(expected));
    }
}

/// Test: a program loaded from JSON runs like the original
#[test]
fn test_reloaded_program_executes() {
    let source = "a &&= a * 2; `a=${a}`";
    let json = parser::compile(source).unwrap().to_json().unwrap();
    let restored = Bytecode::from_json(&json).unwrap();

    let env = Value::object([("a", Value::Number(21.0))]);
    let result = evaluate_blocking(&restored, &env, &NativeHandler).unwrap();
    assert_eq!(result, Value::from("a=42"));
}

/// Test: hand-assembled programs run through the dispatcher
#[test]
fn test_hand_assembled_conditional() {
    // flag ?? 'fallback'
    let mut bytecode = Bytecode::new();
    bytecode.add_name("flag");
    bytecode.add(Opcode::IfNotNull, 0);
    bytecode.add(Opcode::Else, 2);
    bytecode.add(Opcode::Discard, 0);
    bytecode.add_value(Constant::String("fallback".to_string()));
    bytecode.add(Opcode::EndIf, 0);
    bytecode.validate().unwrap();

    let env = Value::object([("flag", Value::Null)]);
    let mut dispatcher = Dispatcher::new(&env, &NativeHandler);
    let result = futures::executor::block_on(dispatcher.execute(&bytecode)).unwrap();
    assert_eq!(result, Value::from("fallback"));

    env.set_property("flag", Value::Boolean(false)).unwrap();
    let result = futures::executor::block_on(dispatcher.execute(&bytecode)).unwrap();
    assert_eq!(result, Value::Boolean(false));
}

/// Test: programs that leave the stack unbalanced fail cleanly
#[test]
fn test_unbalanced_program_is_a_machine_error() {
    let mut bytecode = Bytecode::new();
    bytecode.add_value(Constant::Number(1.0));
    bytecode.add_value(Constant::Number(2.0));

    let err = evaluate_blocking(&bytecode, &Value::empty_object(), &NativeHandler).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InternalError);
    assert_eq!(err.message, "VM error: 2 operands left on the stack");
}

/// Test: operators without enough operands fail cleanly
#[test]
fn test_stack_underflow_is_a_machine_error() {
    let mut bytecode = Bytecode::new();
    bytecode.add_value(Constant::Number(1.0));
    bytecode.add(Opcode::Add, 0);

    let err = evaluate_blocking(&bytecode, &Value::empty_object(), &NativeHandler).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InternalError);
    assert!(err.message.starts_with("VM error"));
}
