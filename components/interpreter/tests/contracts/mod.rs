//! Contract tests for interpreter API
//!
//! These tests pin the public surface other crates build on.

use bytecode_system::{Bytecode, Constant, Opcode};
use core_types::{JsError, Value};
use interpreter::{
    evaluate, evaluate_blocking, Dispatcher, Handler, LazyRef, NativeHandler, Operand, Program,
    ScopeFrame, Vm,
};

/// Test Program converts from every accepted input
#[test]
fn test_program_from_contract() {
    let source = String::from("1");
    let bytecode = Bytecode::new();
    assert!(matches!(Program::from("1"), Program::Source("1")));
    assert!(matches!(Program::from(&source), Program::Source("1")));
    assert!(matches!(Program::from(&bytecode), Program::Compiled(_)));
}

/// Test evaluate accepts source text and compiled programs alike
#[test]
fn test_evaluate_contract() {
    let env = Value::object([("n", Value::Number(4.0))]);
    let bytecode = parser::compile("n * n").unwrap();
    let from_source = futures::executor::block_on(evaluate("n * n", &env, &NativeHandler));
    let from_bytecode = evaluate_blocking(&bytecode, &env, &NativeHandler);
    assert_eq!(from_source.unwrap(), Value::Number(16.0));
    assert_eq!(from_bytecode.unwrap(), Value::Number(16.0));
}

/// Test Vm builder methods
#[test]
fn test_vm_builder_contract() {
    struct Silent;
    impl Handler for Silent {
        fn get(&self, _receiver: &Value, _key: &str, _env: &Value) -> Result<Value, JsError> {
            Ok(Value::Number(0.0))
        }
    }

    let vm = Vm::new()
        .with_environment(Value::object([("a", Value::Number(1.0))]))
        .with_handler(Silent);
    assert_eq!(vm.environment().get_property("a").unwrap(), Value::Number(1.0));
    assert_eq!(vm.eval_blocking("a + a").unwrap(), Value::Number(0.0));
}

/// Test Handler default methods behave natively
#[test]
fn test_handler_defaults_contract() {
    let env = Value::empty_object();
    let target = Value::empty_object();
    let handler = NativeHandler;

    handler.set(&target, "k", Value::Boolean(true), &env).unwrap();
    assert_eq!(handler.get(&target, "k", &env).unwrap(), Value::Boolean(true));
    assert!(handler.delete_property(&target, "k").unwrap());
    assert_eq!(handler.get(&target, "k", &env).unwrap(), Value::Undefined);

    let f = Value::function("id", |_, args| Ok(args[0].clone()));
    let result = handler.apply(&f, &env, &[Value::from("x")]).unwrap();
    assert_eq!(result, Value::from("x"));
}

/// Test Dispatcher runs hand-assembled bytecode
#[test]
fn test_dispatcher_contract() {
    let env = Value::object([("a", Value::Number(5.0))]);
    let mut bytecode = Bytecode::new();
    bytecode.add_name("a");
    bytecode.add_value(Constant::Number(2.0));
    bytecode.add(Opcode::Mul, 0);

    let mut dispatcher = Dispatcher::new(&env, &NativeHandler);
    let first = futures::executor::block_on(dispatcher.execute(&bytecode)).unwrap();
    let second = futures::executor::block_on(dispatcher.execute(&bytecode)).unwrap();
    assert_eq!(first, Value::Number(10.0));
    assert_eq!(second, Value::Number(10.0));
}

/// Test LazyRef reads and writes through a handler
#[test]
fn test_lazy_ref_contract() {
    let env = Value::empty_object();
    let reference = LazyRef::new(env.clone(), "answer");
    assert_eq!(reference.name(), "answer");
    assert_eq!(reference.set(Value::Number(42.0), &env, &NativeHandler).unwrap(), Value::Number(42.0));
    assert_eq!(reference.get(&env, &NativeHandler).unwrap(), Value::Number(42.0));
}

/// Test Operand exposes its reference
#[test]
fn test_operand_contract() {
    let reference = LazyRef::new(Value::Null, "x");
    assert!(Operand::Ref(reference.clone()).reference().is_some());
    assert!(Operand::Cached(reference, Value::Null).reference().is_some());
    assert!(Operand::from(Value::Null).reference().is_none());
    assert!(Operand::Spread(Value::Null).reference().is_none());
}

/// Test ScopeFrame bounds
#[test]
fn test_scope_frame_contract() {
    let frame = ScopeFrame::new(3, 3);
    assert!(frame.is_done());
    let frame = ScopeFrame::new(0, 2);
    assert_eq!((frame.ip, frame.end), (0, 2));
    assert!(!frame.is_done());
}
