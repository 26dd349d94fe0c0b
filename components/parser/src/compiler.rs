//! Compiler - token stream to bytecode
//!
//! Compilation is a single pass over the token stream. Every nesting level
//! (statement block, parenthesized group, argument list, branch of a
//! conditional, ...) runs its own small state machine through
//! `compile_context`, sharing one append-only [`Bytecode`] buffer.
//!
//! Operators are emitted in postfix order as soon as their right operand is
//! complete. Lower-precedence operators that were emitted too early are
//! moved behind the new one by rotating the tail of the buffer, so no syntax
//! tree is ever built.

use bytecode_system::{Bytecode, Constant, Opcode};
use core_types::{JsError, SourcePosition};
use tracing::{debug, trace};

use crate::error::{syntax_error, unexpected_eof, unexpected_token};
use crate::lexer::Lexer;
use crate::token::{Token, TokenSource, TokenType};

/// Compile source text into a program
pub fn compile(source: &str) -> Result<Bytecode, JsError> {
    compile_tokens(Lexer::new(source))
}

/// Compile an arbitrary token stream into a program
pub fn compile_tokens<T: TokenSource>(tokens: T) -> Result<Bytecode, JsError> {
    let mut compiler = Compiler::new(tokens);
    let outcome = compiler.compile_context(Context::Primary)?;
    if outcome.exit != Exit::Eof {
        return Err(compiler.stray_terminator(outcome.exit));
    }
    debug!(
        instructions = compiler.bytecode.len(),
        pool = compiler.bytecode.pool().len(),
        "compiled program"
    );
    Ok(compiler.bytecode)
}

/// What a nesting level is compiling; decides which tokens end it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Statement list: the whole program or a braced block
    Primary,
    /// Exactly one statement (an `if` branch)
    PrimaryOneStmt,
    /// Parenthesized expression, index expression or `if` condition
    Secondary,
    /// Array literal elements
    Array,
    /// Object literal value or spread
    Object,
    /// Call or construct arguments
    FuncArgs,
    /// Ternary branches and assignment right-hand sides
    ToComma,
    /// Right-hand side of `&&`: also stops before `||`, `??` and `?`
    ToCommaOrPipePipe,
    /// Right-hand side of `||` and `??`: also stops before `?`
    ToCommaOrQuestion,
    /// Interpolation of an untagged template
    StringTemplateConcat,
    /// Interpolation of a tagged template
    StringTemplate,
}

/// Why a nesting level returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Eof,
    ParenClose,
    SquareClose,
    BraceClose,
    Comma,
    Semicolon,
    /// The statement ended; the next token is waiting to be read
    NewExpr,
    PipePipe,
    Question,
    TemplateMid,
    TemplateEnd,
    Colon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expecting {
    Value,
    Operation,
}

#[derive(Debug, Clone, Copy)]
struct Outcome {
    exit: Exit,
    n_args: u32,
}

/// A significant token and whether a line break preceded it
#[derive(Debug, Clone)]
struct Lookahead {
    token: Token,
    after_newline: bool,
}

/// Per-context compilation state
struct State {
    context: Context,
    expecting: Expecting,
    /// An operand is emitted but may still grow by member access or calls
    open: bool,
    operand_start: usize,
    /// Prefix operators waiting for their operand, outermost first
    unary: Vec<(Opcode, SourcePosition)>,
    /// `QEST_DOT`s of the open operand; patched with the length of the
    /// chain they skip once the operand closes
    optional: Vec<usize>,
    /// Binary or assignment operator waiting for its right operand
    pending: Option<Opcode>,
    /// First instruction the precedence scan may move
    floor: usize,
    /// End of the left side when the pending operator was read
    tail_end: usize,
    n_args: u32,
    /// Nothing of the current statement or list element has been read
    at_start: bool,
    spread: bool,
    context_start: usize,
    separator_at: Option<usize>,
}

impl State {
    fn new(context: Context, start: usize) -> Self {
        State {
            context,
            expecting: Expecting::Value,
            open: false,
            operand_start: start,
            unary: Vec::new(),
            optional: Vec::new(),
            pending: None,
            floor: start,
            tail_end: start,
            n_args: 1,
            at_start: true,
            spread: false,
            context_start: start,
            separator_at: None,
        }
    }

    /// Start a new operator chain at `start`
    fn reset_chain(&mut self, start: usize) {
        self.expecting = Expecting::Value;
        self.open = false;
        self.unary.clear();
        self.optional.clear();
        self.pending = None;
        self.floor = start;
        self.tail_end = start;
        self.spread = false;
    }

    /// Element count for list contexts; a trailing comma adds no element
    fn count(&self) -> u32 {
        if self.at_start {
            self.n_args - 1
        } else {
            self.n_args
        }
    }

    fn is_list(&self) -> bool {
        matches!(self.context, Context::Array | Context::FuncArgs)
    }

    fn is_rhs(&self) -> bool {
        matches!(
            self.context,
            Context::ToComma | Context::ToCommaOrPipePipe | Context::ToCommaOrQuestion
        )
    }
}

struct Compiler<T> {
    tokens: T,
    bytecode: Bytecode,
    pushback: Option<Lookahead>,
    exhausted: bool,
    last_position: SourcePosition,
}

impl<T: TokenSource> Compiler<T> {
    fn new(tokens: T) -> Self {
        Compiler {
            tokens,
            bytecode: Bytecode::new(),
            pushback: None,
            exhausted: false,
            last_position: SourcePosition::new(1, 1, 0),
        }
    }

    /// Next token that is not whitespace, a comment or a continuation request
    fn next_significant(&mut self) -> Result<Option<Lookahead>, JsError> {
        if let Some(lookahead) = self.pushback.take() {
            return Ok(Some(lookahead));
        }
        let mut after_newline = false;
        while !self.exhausted {
            match self.tokens.next() {
                None => self.exhausted = true,
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Err(e);
                }
                Some(Ok(token)) if token.token_type == TokenType::End => self.exhausted = true,
                Some(Ok(token)) if token.is_trivia() => after_newline |= token.has_newline(),
                Some(Ok(token)) => {
                    self.last_position = token.position();
                    return Ok(Some(Lookahead { token, after_newline }));
                }
            }
        }
        Ok(None)
    }

    /// Hand a terminator back to the enclosing context
    fn push_back(&mut self, lookahead: Lookahead) {
        self.pushback = Some(lookahead);
    }

    /// Consume a terminator the enclosing context expected
    fn drop_terminator(&mut self) {
        self.pushback = None;
    }

    fn terminator_position(&self) -> SourcePosition {
        self.pushback
            .as_ref()
            .map(|l| l.token.position())
            .unwrap_or(self.last_position)
    }

    fn compile_context(&mut self, context: Context) -> Result<Outcome, JsError> {
        trace!(?context, at = self.bytecode.len(), "enter context");
        let mut st = State::new(context, self.bytecode.len());
        loop {
            let Some(lookahead) = self.next_significant()? else {
                let exit = self.end_of_input(&mut st)?;
                return Ok(Outcome { exit, n_args: st.count() });
            };
            let exit = match st.expecting {
                Expecting::Value => self.value_token(&mut st, lookahead)?,
                Expecting::Operation => self.operation_token(&mut st, lookahead)?,
            };
            if let Some(exit) = exit {
                trace!(?context, ?exit, "leave context");
                return Ok(Outcome { exit, n_args: st.count() });
            }
        }
    }

    fn end_of_input(&mut self, st: &mut State) -> Result<Exit, JsError> {
        match st.expecting {
            Expecting::Operation => {
                self.complete_operand(st)?;
                self.finish_element(st);
                Ok(Exit::Eof)
            }
            Expecting::Value if st.at_start => match st.context {
                Context::Primary => {
                    self.close_statements(st);
                    Ok(Exit::Eof)
                }
                Context::PrimaryOneStmt
                | Context::ToComma
                | Context::ToCommaOrPipePipe
                | Context::ToCommaOrQuestion => Err(unexpected_eof(self.last_position)),
                // The opener reports the missing closer
                _ => Ok(Exit::Eof),
            },
            Expecting::Value => Err(unexpected_eof(self.last_position)),
        }
    }

    /// Drop the separator after the last statement so the block yields that
    /// statement's value; an empty block yields `undefined`.
    fn close_statements(&mut self, st: &mut State) {
        let len = self.bytecode.len();
        if len > 0 && st.separator_at == Some(len - 1) {
            self.bytecode.pop();
        }
        if self.bytecode.len() == st.context_start {
            self.bytecode.add_value(Constant::Undefined);
        }
    }

    /// Emit a statement separator and start a new statement
    fn separator(&mut self, st: &mut State) {
        let at = self.bytecode.add(Opcode::Discard, 0);
        st.separator_at = Some(at);
        st.reset_chain(self.bytecode.len());
        st.at_start = true;
    }

    fn begin_operand(&mut self, st: &mut State) {
        st.operand_start = self.bytecode.len();
        st.at_start = false;
    }

    fn end_operand(&mut self, st: &mut State) {
        st.expecting = Expecting::Operation;
        st.open = true;
    }

    fn is_bare_literal(&self, start: usize) -> bool {
        self.bytecode.len() == start + 1
            && self.bytecode.instruction(start).map(|i| i.opcode) == Some(Opcode::Value)
    }

    fn last_is_literal(&self) -> bool {
        self.bytecode
            .instructions()
            .last()
            .is_some_and(|i| i.opcode == Opcode::Value)
    }

    // ------------------------------------------------------------------
    // VALUE mode
    // ------------------------------------------------------------------

    fn value_token(&mut self, st: &mut State, lookahead: Lookahead) -> Result<Option<Exit>, JsError> {
        let pos = lookahead.token.position();
        let token_type = lookahead.token.token_type;
        match token_type {
            TokenType::Number | TokenType::String | TokenType::RegExp | TokenType::StringTemplate => {
                let value = literal_value(&lookahead.token)?;
                self.begin_operand(st);
                self.bytecode.add_value(value);
                self.end_operand(st);
            }
            TokenType::StringTemplateBegin => {
                self.begin_operand(st);
                self.compile_template(&lookahead.token)?;
                self.end_operand(st);
            }
            TokenType::Ident => return self.value_ident(st, &lookahead.token, pos),
            TokenType::Other => return self.value_punct(st, lookahead),
            _ => return Err(unexpected_token(&lookahead.token.text, pos)),
        }
        Ok(None)
    }

    fn value_ident(&mut self, st: &mut State, token: &Token, pos: SourcePosition) -> Result<Option<Exit>, JsError> {
        let literal = match token.text.as_str() {
            "true" => Some(Constant::Boolean(true)),
            "false" => Some(Constant::Boolean(false)),
            "null" => Some(Constant::Null),
            "undefined" => Some(Constant::Undefined),
            "NaN" => Some(Constant::Number(f64::NAN)),
            "Infinity" => Some(Constant::Number(f64::INFINITY)),
            _ => None,
        };
        if let Some(value) = literal {
            self.begin_operand(st);
            self.bytecode.add_value(value);
            self.end_operand(st);
            return Ok(None);
        }

        let prefix = match token.text.as_str() {
            "typeof" => Some(Opcode::TypeOf),
            "void" => Some(Opcode::Void),
            "delete" => Some(Opcode::Delete),
            "new" => Some(Opcode::New),
            _ => None,
        };
        if let Some(op) = prefix {
            st.unary.push((op, pos));
            st.at_start = false;
            return Ok(None);
        }

        let statement = matches!(st.context, Context::Primary | Context::PrimaryOneStmt);
        if token.text == "if" && statement && st.at_start {
            self.compile_if(pos)?;
            if st.context == Context::PrimaryOneStmt {
                return Ok(Some(Exit::NewExpr));
            }
            self.separator(st);
            return Ok(None);
        }

        self.begin_operand(st);
        self.bytecode.add_name(&token.text);
        self.end_operand(st);
        Ok(None)
    }

    fn value_punct(&mut self, st: &mut State, lookahead: Lookahead) -> Result<Option<Exit>, JsError> {
        let pos = lookahead.token.position();
        let prefix = match lookahead.token.text.as_str() {
            "+" => Some(Opcode::UnaryPlus),
            "-" => Some(Opcode::Neg),
            "~" => Some(Opcode::Inv),
            "!" => Some(Opcode::Not),
            "++" => Some(Opcode::Inc),
            "--" => Some(Opcode::Dec),
            _ => None,
        };
        if let Some(op) = prefix {
            st.unary.push((op, pos));
            st.at_start = false;
            return Ok(None);
        }

        match lookahead.token.text.as_str() {
            "..." => {
                if !(st.is_list() && st.at_start) {
                    return Err(syntax_error("Misplaced spread operator", pos));
                }
                st.spread = true;
                st.at_start = false;
            }
            "(" => {
                self.begin_operand(st);
                let outcome = self.compile_context(Context::Secondary)?;
                self.expect_closer(outcome, Exit::ParenClose, "Unbalanced parentheses", pos)?;
                self.end_operand(st);
            }
            "[" => {
                self.begin_operand(st);
                let outcome = self.compile_context(Context::Array)?;
                self.expect_closer(outcome, Exit::SquareClose, "Unbalanced square brackets", pos)?;
                self.bytecode.add(Opcode::Array, outcome.n_args);
                self.end_operand(st);
            }
            "{" if st.at_start && matches!(st.context, Context::Primary | Context::PrimaryOneStmt) => {
                let outcome = self.compile_context(Context::Primary)?;
                self.expect_closer(outcome, Exit::BraceClose, "Unbalanced braces", pos)?;
                if st.context == Context::PrimaryOneStmt {
                    return Ok(Some(Exit::NewExpr));
                }
                self.separator(st);
            }
            "{" => {
                self.begin_operand(st);
                self.compile_object(pos)?;
                self.end_operand(st);
            }
            ")" if st.context == Context::FuncArgs && st.at_start => {
                self.push_back(lookahead);
                return Ok(Some(Exit::ParenClose));
            }
            ")" => return Err(syntax_error("Unexpected parenthesis close", pos)),
            "]" if st.context == Context::Array && st.at_start => {
                self.push_back(lookahead);
                return Ok(Some(Exit::SquareClose));
            }
            "]" => return Err(syntax_error("Unexpected square bracket close", pos)),
            "}" if st.context == Context::Primary && st.at_start => {
                self.close_statements(st);
                self.push_back(lookahead);
                return Ok(Some(Exit::BraceClose));
            }
            "}" => return Err(syntax_error("Unexpected brace close", pos)),
            ";" if st.context == Context::Primary && st.at_start => {}
            ";" if st.context == Context::PrimaryOneStmt && st.at_start => {
                self.bytecode.add_value(Constant::Undefined);
                self.push_back(lookahead);
                return Ok(Some(Exit::Semicolon));
            }
            ";" => return Err(syntax_error("Unexpected semicolon", pos)),
            text => return Err(unexpected_token(text, pos)),
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // OPERATION mode
    // ------------------------------------------------------------------

    fn operation_token(&mut self, st: &mut State, lookahead: Lookahead) -> Result<Option<Exit>, JsError> {
        let pos = lookahead.token.position();

        // Member access, calls, indexing, postfix updates and tags extend the
        // operand before its prefix operators apply.
        match lookahead.token.token_type {
            TokenType::Other => match lookahead.token.text.as_str() {
                "." => return self.member(st, Opcode::Dot).map(|_| None),
                "?." => return self.member(st, Opcode::QestDot).map(|_| None),
                "[" => {
                    let outcome = self.compile_context(Context::Secondary)?;
                    self.expect_closer(outcome, Exit::SquareClose, "Unbalanced square brackets", pos)?;
                    self.bytecode.add(Opcode::Get, 0);
                    return Ok(None);
                }
                "(" => {
                    let outcome = self.compile_context(Context::FuncArgs)?;
                    self.expect_closer(outcome, Exit::ParenClose, "Unbalanced parentheses", pos)?;
                    if matches!(st.unary.last(), Some((Opcode::New, _))) {
                        st.unary.pop();
                        self.bytecode.add(Opcode::New, outcome.n_args);
                    } else {
                        self.bytecode.add(Opcode::Call, outcome.n_args);
                    }
                    return Ok(None);
                }
                "++" | "--" if !lookahead.after_newline => {
                    if self.is_bare_literal(st.operand_start) {
                        return Err(syntax_error(
                            "Invalid left-hand side expression in postfix operation",
                            pos,
                        ));
                    }
                    let op = if lookahead.token.text == "++" {
                        Opcode::IncLater
                    } else {
                        Opcode::DecLater
                    };
                    self.bytecode.add(op, 0);
                    return Ok(None);
                }
                _ => {}
            },
            TokenType::StringTemplate | TokenType::StringTemplateBegin => {
                self.compile_tagged_template(&lookahead.token)?;
                return Ok(None);
            }
            _ => {}
        }

        self.complete_operand(st)?;

        match lookahead.token.token_type {
            TokenType::StringTemplateMid | TokenType::StringTemplateEnd => {
                self.template_part(st, lookahead)
            }
            TokenType::Ident => match lookahead.token.text.as_str() {
                "in" => self.binary(st, Opcode::In, pos).map(|_| None),
                "instanceof" => self.binary(st, Opcode::InstanceOf, pos).map(|_| None),
                _ => self.statement_break(st, lookahead),
            },
            TokenType::Other => self.operation_punct(st, lookahead),
            _ => self.statement_break(st, lookahead),
        }
    }

    fn operation_punct(&mut self, st: &mut State, lookahead: Lookahead) -> Result<Option<Exit>, JsError> {
        let pos = lookahead.token.position();
        let text = lookahead.token.text.as_str();
        if let Some(op) = binary_opcode(text) {
            self.binary(st, op, pos)?;
            return Ok(None);
        }

        match text {
            "||" | "??" | "||=" | "??=" if st.context == Context::ToCommaOrPipePipe => {
                self.push_back(lookahead);
                Ok(Some(Exit::PipePipe))
            }
            "&&" | "||" | "??" | "&&=" | "||=" | "??=" => {
                self.logical(st, text, pos)?;
                Ok(None)
            }
            "?" if matches!(st.context, Context::ToCommaOrPipePipe | Context::ToCommaOrQuestion) => {
                self.push_back(lookahead);
                Ok(Some(Exit::Question))
            }
            "?" => {
                self.ternary(st, pos)?;
                Ok(None)
            }
            ":" => {
                self.push_back(lookahead);
                Ok(Some(Exit::Colon))
            }
            "," => match st.context {
                Context::Object => {
                    self.push_back(lookahead);
                    Ok(Some(Exit::Comma))
                }
                _ if st.is_rhs() => {
                    self.push_back(lookahead);
                    Ok(Some(Exit::Comma))
                }
                Context::Array | Context::FuncArgs => {
                    self.finish_element(st);
                    st.n_args += 1;
                    st.reset_chain(self.bytecode.len());
                    st.at_start = true;
                    Ok(None)
                }
                _ => {
                    self.bytecode.add(Opcode::Discard, 0);
                    st.reset_chain(self.bytecode.len());
                    Ok(None)
                }
            },
            ";" => match st.context {
                Context::Primary => {
                    self.separator(st);
                    Ok(None)
                }
                Context::PrimaryOneStmt => {
                    self.push_back(lookahead);
                    Ok(Some(Exit::Semicolon))
                }
                _ if st.is_rhs() => {
                    self.push_back(lookahead);
                    Ok(Some(Exit::Semicolon))
                }
                Context::Object => Err(syntax_error("Object expression not terminated", pos)),
                Context::Array => Err(syntax_error("Array expression not terminated", pos)),
                Context::FuncArgs => Err(syntax_error("Unexpected semicolon in function arguments", pos)),
                Context::StringTemplate | Context::StringTemplateConcat => Err(syntax_error(
                    "Unexpected semicolon in string template parameter",
                    pos,
                )),
                _ => Err(syntax_error("Unexpected semicolon in parenthesized expression", pos)),
            },
            ")" | "]" | "}" => {
                self.finish_element(st);
                let exit = match text {
                    ")" => Exit::ParenClose,
                    "]" => Exit::SquareClose,
                    _ => Exit::BraceClose,
                };
                self.push_back(lookahead);
                Ok(Some(exit))
            }
            _ => self.statement_break(st, lookahead),
        }
    }

    /// A token that cannot continue the expression: legal only as the
    /// start of a new statement on a new line.
    fn statement_break(&mut self, st: &mut State, lookahead: Lookahead) -> Result<Option<Exit>, JsError> {
        if !lookahead.after_newline {
            return Err(unexpected_token(&lookahead.token.text, lookahead.token.position()));
        }
        match st.context {
            Context::Primary => {
                self.separator(st);
                self.push_back(lookahead);
                Ok(None)
            }
            Context::PrimaryOneStmt => {
                self.push_back(lookahead);
                Ok(Some(Exit::NewExpr))
            }
            _ if st.is_rhs() => {
                self.push_back(lookahead);
                Ok(Some(Exit::NewExpr))
            }
            _ => Err(unexpected_token(&lookahead.token.text, lookahead.token.position())),
        }
    }

    /// Template text after an interpolation
    fn template_part(&mut self, st: &mut State, lookahead: Lookahead) -> Result<Option<Exit>, JsError> {
        let token = &lookahead.token;
        let exit = if token.token_type == TokenType::StringTemplateMid {
            Exit::TemplateMid
        } else {
            Exit::TemplateEnd
        };
        match st.context {
            Context::StringTemplateConcat => {
                self.bytecode.add_value(Constant::String(token.string_value()));
                self.bytecode.add(Opcode::Add, 0);
                self.bytecode.add(Opcode::Add, 0);
            }
            Context::StringTemplate => {
                self.bytecode.add_value(Constant::String(token.string_value()));
                self.bytecode.add_value(Constant::String(raw_text(token).to_string()));
            }
            _ => self.push_back(lookahead),
        }
        Ok(Some(exit))
    }

    // ------------------------------------------------------------------
    // Operand completion and precedence
    // ------------------------------------------------------------------

    /// Close the current operand: emit its prefix operators innermost
    /// first, then the pending binary operator.
    fn complete_operand(&mut self, st: &mut State) -> Result<(), JsError> {
        if !st.open {
            return Ok(());
        }
        st.open = false;
        for at in st.optional.drain(..) {
            let length = self.bytecode.len() - at - 1;
            self.bytecode.patch(at, length as u32);
        }
        while let Some((op, pos)) = st.unary.pop() {
            if matches!(op, Opcode::Inc | Opcode::Dec) && self.is_bare_literal(st.operand_start) {
                return Err(syntax_error(
                    "Invalid left-hand side expression in prefix operation",
                    pos,
                ));
            }
            self.bytecode.add(op, 0);
        }
        match st.pending.take() {
            Some(op) => self.resolve(st, op, 0),
            None => st.floor = self.bytecode.len(),
        }
        Ok(())
    }

    /// Emit `op` after its right operand and move the operators of the left
    /// side that bind less tightly behind it.
    fn resolve(&mut self, st: &mut State, op: Opcode, operand: u32) {
        let precedence = op.precedence();
        let right_assoc = op.is_right_assoc();
        let mut stop = st.tail_end;
        while stop > st.floor {
            let Some(prev) = self.bytecode.instruction(stop - 1) else {
                break;
            };
            let p = prev.opcode.precedence();
            if p < precedence || (right_assoc && p == precedence) {
                stop -= 1;
            } else {
                break;
            }
        }
        let shift = st.tail_end - stop;
        let at = self.bytecode.add(op, operand);
        self.bytecode.rotate_to_end(stop, st.tail_end);
        st.floor = at - shift;
        trace!(op = op.name(), shift, "resolved operator");
    }

    fn binary(&mut self, st: &mut State, op: Opcode, pos: SourcePosition) -> Result<(), JsError> {
        if op.is_assignment() && self.last_is_literal() {
            return Err(syntax_error("Invalid left-hand side in assignment", pos));
        }
        st.pending = Some(op);
        st.tail_end = self.bytecode.len();
        st.expecting = Expecting::Value;
        Ok(())
    }

    fn finish_element(&mut self, st: &mut State) {
        if st.spread {
            self.bytecode.add(Opcode::Spread, 0);
            st.spread = false;
        }
    }

    /// `.name` or `?.name`. A `?.` skips the rest of the chain, so its
    /// operand is filled in by `complete_operand`.
    fn member(&mut self, st: &mut State, op: Opcode) -> Result<(), JsError> {
        match self.next_significant()? {
            Some(Lookahead { token, .. }) if token.token_type == TokenType::Ident => {
                self.bytecode.add_name(&token.text);
                let at = self.bytecode.add(op, 0);
                if op == Opcode::QestDot {
                    st.optional.push(at);
                }
                Ok(())
            }
            Some(Lookahead { token, .. }) if op == Opcode::QestDot && token.is_punct("[") => Err(
                syntax_error("Optional computed access `?.[` is not supported", token.position()),
            ),
            Some(Lookahead { token, .. }) if op == Opcode::QestDot && token.is_punct("(") => Err(
                syntax_error("Optional call `?.(` is not supported", token.position()),
            ),
            Some(Lookahead { token, .. }) => Err(unexpected_token(&token.text, token.position())),
            None => Err(unexpected_eof(self.last_position)),
        }
    }

    fn expect_closer(
        &mut self,
        outcome: Outcome,
        closer: Exit,
        message: &str,
        open: SourcePosition,
    ) -> Result<(), JsError> {
        if outcome.exit == closer {
            self.drop_terminator();
            Ok(())
        } else {
            Err(syntax_error(message, open))
        }
    }

    fn patch_to_here(&mut self, branch: usize) {
        let length = self.bytecode.len() - branch - 1;
        self.bytecode.patch(branch, length as u32);
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    /// Short-circuit operators and their assignment forms.
    ///
    /// The right-hand side is compiled in its own context; whatever token
    /// ended it is re-read by this one.
    fn logical(&mut self, st: &mut State, text: &str, pos: SourcePosition) -> Result<(), JsError> {
        let assigns = text.ends_with('=');
        if assigns && self.last_is_literal() {
            return Err(syntax_error("Invalid left-hand side in assignment", pos));
        }
        let test = if text.starts_with("??") { Opcode::IfNotNull } else { Opcode::If };
        st.tail_end = self.bytecode.len();

        match text {
            "&&" => {
                let branch = self.bytecode.add(Opcode::If, 0);
                self.bytecode.add(Opcode::Discard, 0);
                self.compile_context(Context::ToCommaOrPipePipe)?;
                self.patch_to_here(branch);
                self.bytecode.add(Opcode::Else, 0);
            }
            "&&=" => {
                let branch = self.bytecode.add(Opcode::If, 0);
                self.compile_context(Context::ToComma)?;
                self.bytecode.add(Opcode::Assign, 0);
                self.patch_to_here(branch);
                self.bytecode.add(Opcode::Else, 0);
            }
            "||" | "??" => {
                self.bytecode.add(test, 0);
                let branch = self.bytecode.add(Opcode::Else, 0);
                self.bytecode.add(Opcode::Discard, 0);
                self.compile_context(Context::ToCommaOrQuestion)?;
                self.patch_to_here(branch);
            }
            _ => {
                self.bytecode.add(test, 0);
                let branch = self.bytecode.add(Opcode::Else, 0);
                self.compile_context(Context::ToComma)?;
                self.bytecode.add(Opcode::Assign, 0);
                self.patch_to_here(branch);
            }
        }
        self.resolve(st, Opcode::EndIf, 0);
        Ok(())
    }

    fn ternary(&mut self, st: &mut State, pos: SourcePosition) -> Result<(), JsError> {
        st.tail_end = self.bytecode.len();
        let branch = self.bytecode.add(Opcode::If, 0);
        self.bytecode.add(Opcode::Discard, 0);
        let then = self.compile_context(Context::ToComma)?;
        if then.exit != Exit::Colon {
            return Err(syntax_error("Ternary operator not terminated", pos));
        }
        self.drop_terminator();
        self.patch_to_here(branch);

        let branch = self.bytecode.add(Opcode::Else, 0);
        self.bytecode.add(Opcode::Discard, 0);
        self.compile_context(Context::ToComma)?;
        self.patch_to_here(branch);
        self.resolve(st, Opcode::EndIf, 0);
        Ok(())
    }

    /// `if (cond) stmt [else stmt]`; `if` itself is already consumed.
    fn compile_if(&mut self, pos: SourcePosition) -> Result<(), JsError> {
        let open = match self.next_significant()? {
            Some(l) if l.token.is_punct("(") => l.token.position(),
            Some(l) => return Err(syntax_error("Expected \"(\" after \"if\"", l.token.position())),
            None => return Err(syntax_error("Expected \"(\" after \"if\"", pos)),
        };
        let condition = self.compile_context(Context::Secondary)?;
        self.expect_closer(condition, Exit::ParenClose, "Unbalanced parentheses", open)?;

        let branch = self.bytecode.add(Opcode::If, 0);
        self.bytecode.add(Opcode::Discard, 0);
        let then = self.compile_context(Context::PrimaryOneStmt)?;
        if then.exit == Exit::Semicolon {
            self.drop_terminator();
        }
        self.patch_to_here(branch);

        let branch = self.bytecode.add(Opcode::Else, 0);
        match self.next_significant()? {
            Some(l) if l.token.is_ident("else") => {
                self.bytecode.add(Opcode::Discard, 0);
                let otherwise = self.compile_context(Context::PrimaryOneStmt)?;
                if otherwise.exit == Exit::Semicolon {
                    self.drop_terminator();
                }
            }
            Some(l) => self.push_back(l),
            None => {}
        }
        self.patch_to_here(branch);
        self.bytecode.add(Opcode::EndIf, 0);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Aggregates and templates
    // ------------------------------------------------------------------

    /// Object literal; `{` is already consumed. OBJECT's operand counts
    /// stack slots: two per key/value pair, one per spread.
    fn compile_object(&mut self, open: SourcePosition) -> Result<(), JsError> {
        let mut slots = 0;
        loop {
            let Some(lookahead) = self.next_significant()? else {
                return Err(syntax_error("Unbalanced braces", open));
            };
            let token = lookahead.token;
            let pos = token.position();

            match token.token_type {
                TokenType::Other if token.text == "}" => break,
                TokenType::Other if token.text == "..." => {
                    let outcome = self.compile_context(Context::Object)?;
                    self.bytecode.add(Opcode::Spread, 0);
                    slots += 1;
                    if self.object_entry_done(outcome, open)? {
                        break;
                    }
                    continue;
                }
                TokenType::Other if token.text == "[" => {
                    let outcome = self.compile_context(Context::Secondary)?;
                    self.expect_closer(outcome, Exit::SquareClose, "Unbalanced square brackets", pos)?;
                }
                TokenType::String | TokenType::Number => {
                    let key = literal_value(&token)?;
                    self.bytecode.add_value(key);
                }
                TokenType::Ident => {
                    self.bytecode.add_value(Constant::String(token.text.clone()));
                    let next = self.next_significant()?;
                    let shorthand = next
                        .as_ref()
                        .is_some_and(|l| l.token.is_punct(",") || l.token.is_punct("}"));
                    if shorthand {
                        self.bytecode.add_name(&token.text);
                        slots += 2;
                        let closed = next.is_some_and(|l| l.token.is_punct("}"));
                        if closed {
                            break;
                        }
                        continue;
                    }
                    if let Some(l) = next {
                        self.push_back(l);
                    }
                }
                _ => return Err(unexpected_token(&token.text, pos)),
            }

            match self.next_significant()? {
                Some(l) if l.token.is_punct(":") => {}
                Some(l) => return Err(syntax_error("Expected \":\"", l.token.position())),
                None => return Err(syntax_error("Expected \":\"", self.last_position)),
            }
            let outcome = self.compile_context(Context::Object)?;
            slots += 2;
            if self.object_entry_done(outcome, open)? {
                break;
            }
        }
        self.bytecode.add(Opcode::Object, slots);
        Ok(())
    }

    /// True if the entry closed the literal, false if a comma follows
    fn object_entry_done(&mut self, outcome: Outcome, open: SourcePosition) -> Result<bool, JsError> {
        match outcome.exit {
            Exit::BraceClose => {
                self.drop_terminator();
                Ok(true)
            }
            Exit::Comma => {
                self.drop_terminator();
                Ok(false)
            }
            _ => Err(syntax_error("Unbalanced braces", open)),
        }
    }

    /// Untagged template starting at `begin`: string concatenation
    fn compile_template(&mut self, begin: &Token) -> Result<(), JsError> {
        self.bytecode.add_value(Constant::String(begin.string_value()));
        loop {
            let outcome = self.compile_context(Context::StringTemplateConcat)?;
            match outcome.exit {
                Exit::TemplateMid => continue,
                Exit::TemplateEnd => return Ok(()),
                _ => return Err(syntax_error("String template not complete", begin.position())),
            }
        }
    }

    /// Tagged template: cooked and raw text of every part, interleaved
    /// with the interpolated values, then STRING_TEMPLATE.
    fn compile_tagged_template(&mut self, head: &Token) -> Result<(), JsError> {
        let mut n_parts = 2;
        self.bytecode.add_value(Constant::String(head.string_value()));
        self.bytecode.add_value(Constant::String(raw_text(head).to_string()));
        if head.token_type == TokenType::StringTemplateBegin {
            loop {
                let outcome = self.compile_context(Context::StringTemplate)?;
                n_parts += 3;
                match outcome.exit {
                    Exit::TemplateMid => continue,
                    Exit::TemplateEnd => break,
                    _ => return Err(syntax_error("String template not complete", head.position())),
                }
            }
        }
        self.bytecode.add(Opcode::StringTemplate, n_parts);
        Ok(())
    }

    fn stray_terminator(&self, exit: Exit) -> JsError {
        let pos = self.terminator_position();
        match exit {
            Exit::ParenClose => syntax_error("Unexpected parenthesis close", pos),
            Exit::SquareClose => syntax_error("Unexpected square bracket close", pos),
            Exit::BraceClose => syntax_error("Unexpected brace close", pos),
            Exit::Colon => syntax_error("Misplaced ternary colon", pos),
            _ => {
                let text = self.pushback.as_ref().map(|l| l.token.text.as_str()).unwrap_or("");
                unexpected_token(text, pos)
            }
        }
    }
}

fn literal_value(token: &Token) -> Result<Constant, JsError> {
    token
        .value
        .clone()
        .ok_or_else(|| syntax_error(format!("Invalid literal {}", token.text), token.position()))
}

/// Template text with its delimiters (`` ` ``, `}`, `${`) sliced off
fn raw_text(token: &Token) -> &str {
    let text = token.text.as_str();
    let tail = match token.token_type {
        TokenType::StringTemplateBegin | TokenType::StringTemplateMid => 2,
        _ => 1,
    };
    text.get(1..text.len().saturating_sub(tail)).unwrap_or("")
}

fn binary_opcode(text: &str) -> Option<Opcode> {
    let op = match text {
        "+" => Opcode::Add,
        "-" => Opcode::Sub,
        "*" => Opcode::Mul,
        "/" => Opcode::Div,
        "%" => Opcode::Mod,
        "**" => Opcode::Pow,
        "<<" => Opcode::Sal,
        ">>" => Opcode::Sar,
        ">>>" => Opcode::Shr,
        "&" => Opcode::BitwiseAnd,
        "|" => Opcode::BitwiseOr,
        "^" => Opcode::BitwiseXor,
        "<" => Opcode::Lt,
        ">" => Opcode::Gt,
        "<=" => Opcode::Le,
        ">=" => Opcode::Ge,
        "==" => Opcode::Eq,
        "!=" => Opcode::Ne,
        "===" => Opcode::EqStrict,
        "!==" => Opcode::NeStrict,
        "=" => Opcode::Assign,
        "+=" => Opcode::AssignAdd,
        "-=" => Opcode::AssignSub,
        "*=" => Opcode::AssignMul,
        "/=" => Opcode::AssignDiv,
        "%=" => Opcode::AssignMod,
        "**=" => Opcode::AssignPow,
        "<<=" => Opcode::AssignSal,
        ">>=" => Opcode::AssignSar,
        ">>>=" => Opcode::AssignShr,
        "&=" => Opcode::AssignBitwiseAnd,
        "|=" => Opcode::AssignBitwiseOr,
        "^=" => Opcode::AssignBitwiseXor,
        _ => return None,
    };
    Some(op)
}
