//! Tests for opcode precedence and mnemonics

use bytecode_system::Opcode;

#[test]
fn test_precedence_ladder() {
    let ladder = [
        Opcode::Value,
        Opcode::Dot,
        Opcode::Call,
        Opcode::Neg,
        Opcode::Pow,
        Opcode::Mul,
        Opcode::Add,
        Opcode::Sal,
        Opcode::Lt,
        Opcode::Eq,
        Opcode::BitwiseAnd,
        Opcode::BitwiseXor,
        Opcode::BitwiseOr,
        Opcode::If,
        Opcode::EndIf,
        Opcode::Assign,
        Opcode::Spread,
        Opcode::Discard,
    ];
    for pair in ladder.windows(2) {
        assert!(
            pair[0].precedence() > pair[1].precedence(),
            "{:?} should bind tighter than {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_same_level_groups() {
    assert_eq!(Opcode::In.precedence(), Opcode::Lt.precedence());
    assert_eq!(Opcode::InstanceOf.precedence(), Opcode::Ge.precedence());
    assert_eq!(Opcode::IncLater.precedence(), Opcode::Call.precedence());
    assert_eq!(Opcode::New.precedence(), Opcode::TypeOf.precedence());
    assert_eq!(Opcode::Else.precedence(), Opcode::IfNotNull.precedence());
}

#[test]
fn test_mnemonics() {
    assert_eq!(Opcode::QestDot.name(), "QEST_DOT");
    assert_eq!(Opcode::IfNotNull.name(), "IF_NOT_NULL");
    assert_eq!(Opcode::AssignBitwiseAnd.name(), "ASSIGN_BITWISE_AND");
    assert_eq!(Opcode::StringTemplate.name(), "STRING_TEMPLATE");
}

#[test]
fn test_operand_bearing_opcodes() {
    assert!(Opcode::Call.has_operand());
    assert!(Opcode::Else.has_operand());
    assert!(!Opcode::EndIf.has_operand());
    assert!(!Opcode::Add.has_operand());
}
