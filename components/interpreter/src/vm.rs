//! Evaluation entry points
//!
//! [`evaluate`] compiles (if needed) and runs a program against an
//! environment and a handler. [`Vm`] bundles an environment and a handler
//! for repeated evaluation.

use std::fmt;
use std::rc::Rc;

use bytecode_system::Bytecode;
use core_types::{JsError, Value};
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::handler::{Handler, NativeHandler};

/// Something that can be evaluated: source text or a compiled program.
#[derive(Debug, Clone, Copy)]
pub enum Program<'a> {
    /// Source text, compiled on every evaluation
    Source(&'a str),
    /// A program compiled earlier
    Compiled(&'a Bytecode),
}

impl<'a> From<&'a str> for Program<'a> {
    fn from(source: &'a str) -> Self {
        Program::Source(source)
    }
}

impl<'a> From<&'a String> for Program<'a> {
    fn from(source: &'a String) -> Self {
        Program::Source(source)
    }
}

impl<'a> From<&'a Bytecode> for Program<'a> {
    fn from(bytecode: &'a Bytecode) -> Self {
        Program::Compiled(bytecode)
    }
}

/// Evaluates a program.
///
/// Bare identifiers are properties of `env`; every property access, call
/// and construction goes through `handler`. The returned future suspends
/// only while a host function's deferred result is pending.
///
/// # Errors
///
/// Syntax errors from compilation, errors raised while running, and errors
/// returned by `handler` or host functions, unchanged.
///
/// # Example
///
/// ```
/// use core_types::Value;
/// use interpreter::{evaluate, NativeHandler};
///
/// let env = Value::object([("x", Value::Number(20.0))]);
/// let result = futures::executor::block_on(evaluate("x * 2 + 2", &env, &NativeHandler));
/// assert_eq!(result.unwrap(), Value::Number(42.0));
/// ```
pub async fn evaluate<'a>(
    program: impl Into<Program<'a>>,
    env: &Value,
    handler: &dyn Handler,
) -> Result<Value, JsError> {
    let compiled;
    let bytecode = match program.into() {
        Program::Source(source) => {
            compiled = parser::compile(source)?;
            &compiled
        }
        Program::Compiled(bytecode) => bytecode,
    };
    debug!(instructions = bytecode.len(), pool = bytecode.pool().len(), "evaluating");
    let result = Dispatcher::new(env, handler).execute(bytecode).await;
    if let Err(error) = &result {
        debug!(%error, "evaluation failed");
    }
    result
}

/// Evaluates a program on the current thread, blocking while a deferred
/// result is pending.
pub fn evaluate_blocking<'a>(
    program: impl Into<Program<'a>>,
    env: &Value,
    handler: &dyn Handler,
) -> Result<Value, JsError> {
    futures::executor::block_on(evaluate(program, env, handler))
}

/// An environment and a handler, reused across evaluations.
///
/// # Example
///
/// ```
/// use interpreter::Vm;
///
/// let vm = Vm::new();
/// vm.eval_blocking("a = 1; b = a + 1").unwrap();
/// assert_eq!(vm.eval_blocking("[a, b]").unwrap().to_string(), "1,2");
/// ```
#[derive(Clone)]
pub struct Vm {
    /// Receiver of bare identifiers
    environment: Value,
    /// Interception capabilities
    handler: Rc<dyn Handler>,
}

impl Vm {
    /// Create a VM with an empty environment and native behaviour
    pub fn new() -> Self {
        Self {
            environment: Value::empty_object(),
            handler: Rc::new(NativeHandler),
        }
    }

    /// Replace the environment
    pub fn with_environment(mut self, environment: Value) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the handler
    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Rc::new(handler);
        self
    }

    /// The environment bare identifiers resolve against
    pub fn environment(&self) -> &Value {
        &self.environment
    }

    /// Evaluate a program
    pub async fn eval<'a>(&self, program: impl Into<Program<'a>>) -> Result<Value, JsError> {
        evaluate(program, &self.environment, &*self.handler).await
    }

    /// Evaluate a program, blocking on deferred results
    pub fn eval_blocking<'a>(&self, program: impl Into<Program<'a>>) -> Result<Value, JsError> {
        evaluate_blocking(program, &self.environment, &*self.handler)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
