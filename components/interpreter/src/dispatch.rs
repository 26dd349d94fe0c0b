//! Dispatch loop for bytecode execution
//!
//! Runs a compiled program on one operand stack and one stack of
//! [`ScopeFrame`]s. Control flow never recurses: a branch pushes the code
//! after its `ENDIF` as a continuation frame and switches to the chosen
//! block. The only suspension point is a call or construction whose result
//! is a [`Deferred`](core_types::Deferred).

use std::cell::RefCell;
use std::rc::Rc;

use bytecode_system::{Bytecode, Constant, Instruction, Opcode};
use core_types::{JsArray, JsError, JsRegExp, Value};
use tracing::{trace, warn};

use crate::handler::Handler;
use crate::lazy_ref::LazyRef;
use crate::operand::Operand;
use crate::operators;
use crate::scope_frame::ScopeFrame;

/// Executes bytecode against an environment and a handler.
///
/// A dispatcher can run any number of programs one after another; the
/// stacks are reset on every [`execute`](Dispatcher::execute).
pub struct Dispatcher<'a> {
    /// Receiver of bare identifiers
    env: &'a Value,
    /// Interception capabilities
    handler: &'a dyn Handler,
    /// Operand stack
    stack: Vec<Operand>,
    /// Pending instruction ranges, innermost last
    frames: Vec<ScopeFrame>,
}

impl std::fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("env", &self.env)
            .field("handler", &"dyn Handler")
            .field("stack", &self.stack)
            .field("frames", &self.frames)
            .finish()
    }
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher bound to `env` and `handler`
    pub fn new(env: &'a Value, handler: &'a dyn Handler) -> Self {
        Self {
            env,
            handler,
            stack: Vec::with_capacity(32),
            frames: Vec::with_capacity(8),
        }
    }

    /// Run `bytecode` to completion and return the value it leaves.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an operation or by the handler.
    /// A program that does not leave exactly one operand fails with an
    /// `InternalError` whose message starts with `VM error`.
    pub async fn execute(&mut self, bytecode: &Bytecode) -> Result<Value, JsError> {
        self.stack.clear();
        self.frames.clear();
        self.frames.push(ScopeFrame::new(0, bytecode.len()));

        while let Some(mut frame) = self.frames.pop() {
            while !frame.is_done() {
                let ip = frame.ip;
                let instruction = bytecode
                    .instruction(ip)
                    .ok_or_else(|| machine_error("instruction pointer out of range"))?;
                frame.ip += 1;
                trace!(ip, opcode = instruction.opcode.name(), depth = self.stack.len(), "step");

                match instruction.opcode {
                    Opcode::If | Opcode::IfNotNull => {
                        let (then_block, else_block, resume) =
                            branch_blocks(bytecode, ip, instruction.operand)?;
                        if resume > frame.end {
                            return Err(machine_error("branch overruns its scope"));
                        }
                        let condition = self.test_condition()?;
                        let taken = if instruction.opcode == Opcode::If {
                            condition.is_truthy()
                        } else {
                            !condition.is_nullish()
                        };
                        self.frames.push(ScopeFrame::new(resume, frame.end));
                        frame = if taken { then_block } else { else_block };
                    }
                    Opcode::QestDot => {
                        let chain_end = frame.ip + instruction.operand as usize;
                        if chain_end > frame.end {
                            return Err(machine_error("optional chain overruns its scope"));
                        }
                        if !self.member_access(true)? {
                            trace!(ip, skipped = instruction.operand, "optional chain short-circuited");
                            frame.ip = chain_end;
                        }
                    }
                    Opcode::Call | Opcode::New | Opcode::StringTemplate => {
                        self.invoke(instruction).await?
                    }
                    _ => self.step(bytecode, instruction)?,
                }
            }
        }

        if self.stack.len() != 1 {
            return Err(machine_error(format!(
                "{} operands left on the stack",
                self.stack.len()
            )));
        }
        let result = self.pop()?;
        self.resolve(result)
    }

    /// Executes one instruction that cannot suspend.
    fn step(&mut self, bytecode: &Bytecode, instruction: Instruction) -> Result<(), JsError> {
        let op = instruction.opcode;
        match op {
            Opcode::Value => {
                let constant = bytecode
                    .constant(instruction.operand)
                    .ok_or_else(|| machine_error("value pool index out of range"))?;
                self.stack.push(Operand::Value(constant_value(constant)?));
            }
            Opcode::Name => {
                let name = bytecode
                    .constant(instruction.operand)
                    .and_then(Constant::as_str)
                    .ok_or_else(|| machine_error("NAME operand is not a string"))?;
                self.stack
                    .push(Operand::Ref(LazyRef::new(self.env.clone(), name)));
            }
            Opcode::Dot => {
                self.member_access(false)?;
            }
            Opcode::Get => {
                let key = self.pop()?;
                let target = self.pop()?;
                let receiver = self.resolve(target)?;
                let key = self.resolve(key)?.to_property_key();
                self.stack.push(Operand::Ref(LazyRef::new(receiver, key)));
            }
            Opcode::Discard => {
                let slot = self.pop()?;
                self.resolve(slot)?;
            }
            Opcode::Array => {
                let slots = self.pop_n(instruction.operand as usize)?;
                let mut elements = Vec::with_capacity(slots.len());
                for slot in slots {
                    match slot {
                        Operand::Spread(value) => elements.extend(spread_elements(&value)?),
                        other => elements.push(self.resolve(other)?),
                    }
                }
                self.stack.push(Operand::Value(Value::array(elements)));
            }
            Opcode::Object => {
                let slots = self.pop_n(instruction.operand as usize)?;
                let object = Value::empty_object();
                let mut slots = slots.into_iter();
                while let Some(slot) = slots.next() {
                    if let Operand::Spread(value) = slot {
                        for (key, value) in spread_entries(&value) {
                            object.set_property(&key, value)?;
                        }
                        continue;
                    }
                    let key = self.resolve(slot)?.to_property_key();
                    let value = match slots.next() {
                        Some(value) => self.resolve(value)?,
                        None => return Err(machine_error("object literal with a dangling key")),
                    };
                    object.set_property(&key, value)?;
                }
                self.stack.push(Operand::Value(object));
            }
            Opcode::UnaryPlus
            | Opcode::Neg
            | Opcode::Inv
            | Opcode::Not
            | Opcode::TypeOf
            | Opcode::Void => {
                let slot = self.pop()?;
                let value = self.resolve(slot)?;
                self.stack.push(Operand::Value(operators::unary(op, &value)?));
            }
            Opcode::Delete => {
                let deleted = match self.pop()? {
                    Operand::Ref(reference) | Operand::Cached(reference, _) => {
                        reference.delete(self.handler)?
                    }
                    _ => true,
                };
                self.stack.push(Operand::Value(Value::Boolean(deleted)));
            }
            Opcode::Inc | Opcode::Dec | Opcode::IncLater | Opcode::DecLater => {
                let slot = self.pop()?;
                let reference = slot.reference().cloned().ok_or_else(|| {
                    let kind = if matches!(op, Opcode::Inc | Opcode::Dec) {
                        "prefix"
                    } else {
                        "postfix"
                    };
                    JsError::reference(format!(
                        "Invalid left-hand side expression in {} operation",
                        kind
                    ))
                })?;
                let old = self.resolve(slot)?.to_number();
                let step = if matches!(op, Opcode::Inc | Opcode::IncLater) {
                    1.0
                } else {
                    -1.0
                };
                let new = reference.set(Value::Number(old + step), self.env, self.handler)?;
                let result = if matches!(op, Opcode::Inc | Opcode::Dec) {
                    new
                } else {
                    Value::Number(old)
                };
                self.stack.push(Operand::Value(result));
            }
            Opcode::Spread => {
                let slot = self.pop()?;
                let value = self.resolve(slot)?;
                self.stack.push(Operand::Spread(value));
            }
            Opcode::Assign => {
                let value = self.pop()?;
                let reference = self.assignment_target()?;
                let value = self.resolve(value)?;
                let value = reference.set(value, self.env, self.handler)?;
                self.stack.push(Operand::Value(value));
            }
            Opcode::EndIf => {}
            Opcode::Else => return Err(machine_error("ELSE outside a branch")),
            Opcode::If
            | Opcode::IfNotNull
            | Opcode::QestDot
            | Opcode::Call
            | Opcode::New
            | Opcode::StringTemplate => {
                return Err(machine_error(format!("{} dispatched out of order", op.name())))
            }
            _ => {
                if let Some(base) = op.compound_base() {
                    let value = self.pop()?;
                    let target = self.pop()?;
                    let reference = target.reference().cloned().ok_or_else(invalid_assignment)?;
                    let current = self.resolve(target)?;
                    let value = self.resolve(value)?;
                    let combined = operators::binary(base, &current, &value)?;
                    let value = reference.set(combined, self.env, self.handler)?;
                    self.stack.push(Operand::Value(value));
                } else {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    let a = self.resolve(a)?;
                    let b = self.resolve(b)?;
                    self.stack.push(Operand::Value(operators::binary(op, &a, &b)?));
                }
            }
        }
        Ok(())
    }

    /// `CALL`, `NEW` and tagged `STRING_TEMPLATE`: the callee is resolved
    /// first, then the arguments left to right.
    async fn invoke(&mut self, instruction: Instruction) -> Result<(), JsError> {
        let op = instruction.opcode;
        let slots = self.pop_n(instruction.operand as usize)?;
        let callee = self.pop()?;

        let (function, receiver, name) = match callee {
            Operand::Ref(reference) => {
                let function = reference.get(self.env, self.handler)?;
                (function, reference.receiver().clone(), Some(reference.name().to_string()))
            }
            Operand::Cached(reference, function) => (
                function,
                reference.receiver().clone(),
                Some(reference.name().to_string()),
            ),
            other => (self.resolve(other)?, self.env.clone(), None),
        };
        if let Some(name) = name.filter(|_| function.is_nullish()) {
            let role = if op == Opcode::New {
                "a constructor"
            } else {
                "a function"
            };
            return Err(JsError::type_error(format!("{} is not {}", name, role)));
        }

        let result = match op {
            Opcode::New => {
                let args = self.arguments(slots)?;
                self.handler.construct(&function, &args, self.env)?
            }
            Opcode::StringTemplate => {
                let args = self.template_arguments(slots)?;
                self.handler.apply(&function, &receiver, &args)?
            }
            _ => {
                let args = self.arguments(slots)?;
                self.handler.apply(&function, &receiver, &args)?
            }
        };
        let result = match result {
            Value::Deferred(deferred) => {
                trace!(opcode = op.name(), "awaiting deferred result");
                deferred.settle().await?
            }
            value => value,
        };
        self.stack.push(Operand::Value(result));
        Ok(())
    }

    /// `DOT` and `QEST_DOT`: binds the popped name to the resolved value
    /// below it. Under `?.` a nullish receiver leaves `undefined` instead
    /// and returns false so the caller can skip the rest of the chain.
    fn member_access(&mut self, optional: bool) -> Result<bool, JsError> {
        let name = match self.pop()? {
            Operand::Ref(reference) => reference,
            _ => return Err(machine_error("member access without a name")),
        };
        let target = self.pop()?;
        let receiver = self.resolve(target)?;
        if optional && receiver.is_nullish() {
            self.stack.push(Operand::Value(Value::Undefined));
            return Ok(false);
        }
        self.stack.push(Operand::Ref(name.bind(receiver)));
        Ok(true)
    }

    /// Resolves the branch condition on top of the stack once and leaves
    /// the result cached in its slot.
    fn test_condition(&mut self) -> Result<Value, JsError> {
        let slot = match self.pop()? {
            Operand::Ref(reference) => {
                let value = reference.get(self.env, self.handler)?;
                Operand::Cached(reference, value)
            }
            cached @ Operand::Cached(..) => cached,
            other => Operand::Value(self.resolve(other)?),
        };
        let value = match &slot {
            Operand::Cached(_, value) | Operand::Value(value) => value.clone(),
            _ => Value::Undefined,
        };
        self.stack.push(slot);
        Ok(value)
    }

    fn arguments(&self, slots: Vec<Operand>) -> Result<Vec<Value>, JsError> {
        let mut args = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Operand::Spread(value) => args.extend(spread_elements(&value)?),
                other => args.push(self.resolve(other)?),
            }
        }
        Ok(args)
    }

    /// Builds the arguments of a template tag: the cooked strings (with a
    /// `raw` property holding the raw strings) followed by the
    /// interpolated values.
    fn template_arguments(&self, slots: Vec<Operand>) -> Result<Vec<Value>, JsError> {
        let mut cooked = Vec::new();
        let mut raw = Vec::new();
        let mut values = Vec::new();
        let mut slots = slots.into_iter();
        loop {
            match (slots.next(), slots.next()) {
                (Some(text), Some(raw_text)) => {
                    cooked.push(self.resolve(text)?);
                    raw.push(self.resolve(raw_text)?);
                }
                _ => return Err(machine_error("malformed template segments")),
            }
            match slots.next() {
                Some(value) => values.push(self.resolve(value)?),
                None => break,
            }
        }

        let mut strings = JsArray::from_elements(cooked);
        strings.properties.insert("raw", Value::array(raw));
        let mut args = vec![Value::Array(Rc::new(RefCell::new(strings)))];
        args.extend(values);
        Ok(args)
    }

    fn assignment_target(&mut self) -> Result<LazyRef, JsError> {
        match self.pop()? {
            Operand::Ref(reference) | Operand::Cached(reference, _) => Ok(reference),
            _ => Err(invalid_assignment()),
        }
    }

    /// Turns a slot into a plain value, reading references through the
    /// handler.
    fn resolve(&self, operand: Operand) -> Result<Value, JsError> {
        match operand {
            Operand::Value(value) | Operand::Cached(_, value) => Ok(value),
            Operand::Ref(reference) => reference.get(self.env, self.handler),
            Operand::Spread(_) => Err(machine_error("spread outside a list")),
        }
    }

    fn pop(&mut self) -> Result<Operand, JsError> {
        self.stack.pop().ok_or_else(|| machine_error("stack underflow"))
    }

    fn pop_n(&mut self, count: usize) -> Result<Vec<Operand>, JsError> {
        if count > self.stack.len() {
            return Err(machine_error("stack underflow"));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }
}

/// Locates the then and else blocks of the branch whose `IF` sits at
/// `at`, and the index just past its `ENDIF`.
fn branch_blocks(
    bytecode: &Bytecode,
    at: usize,
    then_len: u32,
) -> Result<(ScopeFrame, ScopeFrame, usize), JsError> {
    let then_start = at + 1;
    let then_end = then_start + then_len as usize;
    let else_len = match bytecode.instruction(then_end) {
        Some(instruction) if instruction.opcode == Opcode::Else => instruction.operand as usize,
        _ => return Err(machine_error("branch without ELSE")),
    };
    let else_start = then_end + 1;
    let else_end = else_start + else_len;
    match bytecode.instruction(else_end) {
        Some(instruction) if instruction.opcode == Opcode::EndIf => {}
        _ => return Err(machine_error("branch without ENDIF")),
    }
    Ok((
        ScopeFrame::new(then_start, then_end),
        ScopeFrame::new(else_start, else_end),
        else_end + 1,
    ))
}

fn constant_value(constant: &Constant) -> Result<Value, JsError> {
    Ok(match constant {
        Constant::Undefined => Value::Undefined,
        Constant::Null => Value::Null,
        Constant::Boolean(b) => Value::Boolean(*b),
        Constant::Number(n) => Value::Number(*n),
        Constant::String(s) => Value::String(s.clone()),
        Constant::RegExp { pattern, flags } => Value::RegExp(Rc::new(JsRegExp::new(pattern, flags)?)),
    })
}

/// Positional values of a spread argument or array element.
fn spread_elements(value: &Value) -> Result<Vec<Value>, JsError> {
    match value {
        Value::Array(array) => Ok(array.borrow().elements.clone()),
        Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
        other => Err(JsError::type_error(format!("{} is not iterable", other))),
    }
}

/// Key/value pairs merged by an object spread. Primitives contribute
/// nothing except strings, which spread their characters by index.
fn spread_entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(object) => object
            .borrow()
            .properties
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
        Value::Array(array) => {
            let array = array.borrow();
            array
                .elements
                .iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value.clone()))
                .chain(
                    array
                        .properties
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.clone())),
                )
                .collect()
        }
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(index, c)| (index.to_string(), Value::String(c.to_string())))
            .collect(),
        _ => Vec::new(),
    }
}

fn invalid_assignment() -> JsError {
    JsError::reference("Invalid left-hand side in assignment")
}

fn machine_error(detail: impl Into<String>) -> JsError {
    let detail = detail.into();
    warn!(%detail, "machine error");
    JsError::internal(format!("VM error: {}", detail))
}
