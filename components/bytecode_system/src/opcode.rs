//! Bytecode opcodes for the expression stack machine
//!
//! Every opcode carries a fixed precedence and associativity. The compiler
//! emits operators after their operands (postfix order) and uses these to
//! reorder pending operators; the executor ignores them.

use serde::{Deserialize, Serialize};

/// Bytecode opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // Operands
    /// Push a pool constant (operand = pool index)
    Value,
    /// Push a reference to an environment binding (operand = pool index)
    Name,

    // Member access
    /// Bind the name reference on top to the value below it
    Dot,
    /// Like `Dot`, short-circuiting the chain on a nullish receiver
    QestDot,
    /// Computed member access `a[b]`
    Get,
    /// Call with operand = argument count
    Call,
    /// Construct with operand = argument count
    New,
    /// Pop and drop the top of the stack
    Discard,
    /// Build an array from operand stack slots
    Array,
    /// Build an object from operand stack slots (2 per pair, 1 per spread)
    Object,
    /// Tagged template call with operand = number of pushed parts
    StringTemplate,

    // Branching
    /// Branch on the truthiness of the top (operand = then-branch length)
    If,
    /// Branch on the top being neither null nor undefined
    IfNotNull,
    /// Else-branch marker (operand = else-branch length)
    Else,
    /// End of a conditional
    EndIf,

    // Unary
    /// `+a`
    UnaryPlus,
    /// `-a`
    Neg,
    /// `~a`
    Inv,
    /// `!a`
    Not,
    /// `++a`
    Inc,
    /// `--a`
    Dec,
    /// `a++`
    IncLater,
    /// `a--`
    DecLater,
    /// `typeof a`
    TypeOf,
    /// `void a`
    Void,
    /// `delete a.b`
    Delete,
    /// `...a`
    Spread,

    // Binary
    /// `a in b`
    In,
    /// `a instanceof b`
    InstanceOf,
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a % b`
    Mod,
    /// `a ** b`
    Pow,
    /// `a << b`
    Sal,
    /// `a >> b`
    Sar,
    /// `a >>> b`
    Shr,
    /// `a & b`
    BitwiseAnd,
    /// `a | b`
    BitwiseOr,
    /// `a ^ b`
    BitwiseXor,
    /// `a < b`
    Lt,
    /// `a > b`
    Gt,
    /// `a <= b`
    Le,
    /// `a >= b`
    Ge,
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a === b`
    EqStrict,
    /// `a !== b`
    NeStrict,

    // Assignment
    /// `a = b`
    Assign,
    /// `a += b`
    AssignAdd,
    /// `a -= b`
    AssignSub,
    /// `a *= b`
    AssignMul,
    /// `a /= b`
    AssignDiv,
    /// `a %= b`
    AssignMod,
    /// `a **= b`
    AssignPow,
    /// `a <<= b`
    AssignSal,
    /// `a >>= b`
    AssignSar,
    /// `a >>>= b`
    AssignShr,
    /// `a &= b`
    AssignBitwiseAnd,
    /// `a |= b`
    AssignBitwiseOr,
    /// `a ^= b`
    AssignBitwiseXor,
}

impl Opcode {
    /// Binding strength used when reordering pending operators.
    pub fn precedence(self) -> u8 {
        use Opcode::*;
        match self {
            Value | Name => 100,
            Dot | QestDot | Get | Array | Object | StringTemplate => 20,
            Call | IncLater | DecLater => 19,
            New | UnaryPlus | Neg | Inv | Not | Inc | Dec | TypeOf | Void | Delete => 18,
            Pow => 17,
            Mul | Div | Mod => 16,
            Add | Sub => 15,
            Sal | Sar | Shr => 14,
            Lt | Gt | Le | Ge | In | InstanceOf => 13,
            Eq | Ne | EqStrict | NeStrict => 12,
            BitwiseAnd => 11,
            BitwiseXor => 10,
            BitwiseOr => 9,
            If | IfNotNull | Else => 6,
            EndIf => 4,
            Assign | AssignAdd | AssignSub | AssignMul | AssignDiv | AssignMod | AssignPow
            | AssignSal | AssignSar | AssignShr | AssignBitwiseAnd | AssignBitwiseOr
            | AssignBitwiseXor => 2,
            Spread => 1,
            Discard => 0,
        }
    }

    /// True for operators that group right-to-left.
    pub fn is_right_assoc(self) -> bool {
        self == Opcode::Pow || self.is_assignment()
    }

    /// True for `=` and every compound assignment.
    pub fn is_assignment(self) -> bool {
        self.precedence() == 2
    }

    /// The binary operator a compound assignment applies, if any.
    pub fn compound_base(self) -> Option<Opcode> {
        use Opcode::*;
        Some(match self {
            AssignAdd => Add,
            AssignSub => Sub,
            AssignMul => Mul,
            AssignDiv => Div,
            AssignMod => Mod,
            AssignPow => Pow,
            AssignSal => Sal,
            AssignSar => Sar,
            AssignShr => Shr,
            AssignBitwiseAnd => BitwiseAnd,
            AssignBitwiseOr => BitwiseOr,
            AssignBitwiseXor => BitwiseXor,
            _ => return None,
        })
    }

    /// True if the instruction's operand is meaningful.
    pub fn has_operand(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Value | Name | QestDot | Call | New | Array | Object | StringTemplate | If | IfNotNull
                | Else
        )
    }

    /// Disassembly mnemonic.
    pub fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            Value => "VALUE",
            Name => "NAME",
            Dot => "DOT",
            QestDot => "QEST_DOT",
            Get => "GET",
            Call => "CALL",
            New => "NEW",
            Discard => "DISCARD",
            Array => "ARRAY",
            Object => "OBJECT",
            StringTemplate => "STRING_TEMPLATE",
            If => "IF",
            IfNotNull => "IF_NOT_NULL",
            Else => "ELSE",
            EndIf => "ENDIF",
            UnaryPlus => "UNARY_PLUS",
            Neg => "NEG",
            Inv => "INV",
            Not => "NOT",
            Inc => "INC",
            Dec => "DEC",
            IncLater => "INC_LATER",
            DecLater => "DEC_LATER",
            TypeOf => "TYPEOF",
            Void => "VOID",
            Delete => "DELETE",
            Spread => "SPREAD",
            In => "IN",
            InstanceOf => "INSTANCEOF",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Mod => "MOD",
            Pow => "POW",
            Sal => "SAL",
            Sar => "SAR",
            Shr => "SHR",
            BitwiseAnd => "BITWISE_AND",
            BitwiseOr => "BITWISE_OR",
            BitwiseXor => "BITWISE_XOR",
            Lt => "LT",
            Gt => "GT",
            Le => "LE",
            Ge => "GE",
            Eq => "EQ",
            Ne => "NE",
            EqStrict => "EQ_STRICT",
            NeStrict => "NE_STRICT",
            Assign => "ASSIGN",
            AssignAdd => "ASSIGN_ADD",
            AssignSub => "ASSIGN_SUB",
            AssignMul => "ASSIGN_MUL",
            AssignDiv => "ASSIGN_DIV",
            AssignMod => "ASSIGN_MOD",
            AssignPow => "ASSIGN_POW",
            AssignSal => "ASSIGN_SAL",
            AssignSar => "ASSIGN_SAR",
            AssignShr => "ASSIGN_SHR",
            AssignBitwiseAnd => "ASSIGN_BITWISE_AND",
            AssignBitwiseOr => "ASSIGN_BITWISE_OR",
            AssignBitwiseXor => "ASSIGN_BITWISE_XOR",
        }
    }
}
