//! Runtime orchestration for the CLI
//!
//! The Runtime ties the compiler and a persistent [`Vm`] to the demo host
//! environment, so bindings made by one evaluation stay visible to the
//! next.

use bytecode_system::Bytecode;
use core_types::Value;
use interpreter::Vm;
use tracing::debug;

use crate::error::CliResult;
use crate::host;

/// Compiles and evaluates source text for the CLI
#[derive(Debug)]
pub struct Runtime {
    /// Whether to print bytecode before evaluation
    disasm: bool,
    /// Whether results are rendered as JSON
    json: bool,
    /// Persistent VM holding the environment
    vm: Vm,
}

impl Runtime {
    /// Create a runtime over a fresh demo environment
    ///
    /// # Example
    /// ```
    /// use eval_cli::Runtime;
    ///
    /// let runtime = Runtime::new();
    /// let result = runtime.execute_string("Math.max(1, 2)").unwrap();
    /// assert_eq!(runtime.render(&result), "2");
    /// ```
    pub fn new() -> Self {
        Self {
            disasm: false,
            json: false,
            vm: Vm::new().with_environment(host::environment()),
        }
    }

    /// Enable bytecode printing
    pub fn with_disasm(mut self, enabled: bool) -> Self {
        self.disasm = enabled;
        self
    }

    /// Enable JSON output
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// The environment bare identifiers resolve against
    pub fn environment(&self) -> &Value {
        self.vm.environment()
    }

    /// Compile source text to bytecode
    pub fn compile(&self, source: &str) -> CliResult<Bytecode> {
        let bytecode = parser::compile(source)?;
        debug!(instructions = bytecode.len(), "compiled");
        Ok(bytecode)
    }

    /// Compile source text and return its disassembly
    pub fn disassemble(&self, source: &str) -> CliResult<String> {
        Ok(self.compile(source)?.to_string())
    }

    /// Evaluate a file
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or evaluation fails
    pub fn execute_file(&self, path: &str) -> CliResult<Value> {
        let source = std::fs::read_to_string(path)?;
        self.execute_string(&source)
    }

    /// Evaluate source text
    ///
    /// # Errors
    /// Returns `CliError` if compilation or evaluation fails
    pub fn execute_string(&self, source: &str) -> CliResult<Value> {
        let bytecode = self.compile(source)?;
        if self.disasm {
            print!("{}", bytecode);
        }
        Ok(self.vm.eval_blocking(&bytecode)?)
    }

    /// Format a result for display
    pub fn render(&self, value: &Value) -> String {
        if self.json {
            return match value {
                Value::Undefined | Value::Function(_) => "undefined".to_string(),
                other => other.to_json().to_string(),
            };
        }
        format_value(value)
    }

    /// Start the interactive REPL
    pub fn repl(&self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Strings are quoted; objects and arrays print as JSON.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Object(_) | Value::Array(_) => value.to_json().to_string(),
        Value::Function(f) => format!("[Function: {}]", f.name()),
        other => other.to_string(),
    }
}
