//! Unary and binary operator semantics on resolved values

use bytecode_system::Opcode;
use core_types::{JsError, Value};

/// Applies a value-only prefix operator.
pub fn unary(op: Opcode, value: &Value) -> Result<Value, JsError> {
    Ok(match op {
        Opcode::UnaryPlus => Value::Number(value.to_number()),
        Opcode::Neg => Value::Number(-value.to_number()),
        Opcode::Inv => Value::Number(!value.to_int32() as f64),
        Opcode::Not => Value::Boolean(!value.is_truthy()),
        Opcode::TypeOf => Value::from(value.type_of()),
        Opcode::Void => Value::Undefined,
        other => return Err(not_an_operator(other)),
    })
}

/// Applies a binary operator. Compound assignments pass their base operator.
pub fn binary(op: Opcode, a: &Value, b: &Value) -> Result<Value, JsError> {
    Ok(match op {
        Opcode::Add => add(a, b),
        Opcode::Sub => Value::Number(a.to_number() - b.to_number()),
        Opcode::Mul => Value::Number(a.to_number() * b.to_number()),
        Opcode::Div => Value::Number(a.to_number() / b.to_number()),
        Opcode::Mod => Value::Number(a.to_number() % b.to_number()),
        Opcode::Pow => Value::Number(pow(a.to_number(), b.to_number())),
        Opcode::Sal => Value::Number(a.to_int32().wrapping_shl(b.to_uint32() & 31) as f64),
        Opcode::Sar => Value::Number(a.to_int32().wrapping_shr(b.to_uint32() & 31) as f64),
        Opcode::Shr => Value::Number(a.to_uint32().wrapping_shr(b.to_uint32() & 31) as f64),
        Opcode::BitwiseAnd => Value::Number((a.to_int32() & b.to_int32()) as f64),
        Opcode::BitwiseOr => Value::Number((a.to_int32() | b.to_int32()) as f64),
        Opcode::BitwiseXor => Value::Number((a.to_int32() ^ b.to_int32()) as f64),
        Opcode::Lt => Value::Boolean(a.less_than(b) == Some(true)),
        Opcode::Gt => Value::Boolean(b.less_than(a) == Some(true)),
        Opcode::Le => Value::Boolean(b.less_than(a) == Some(false)),
        Opcode::Ge => Value::Boolean(a.less_than(b) == Some(false)),
        Opcode::Eq => Value::Boolean(a.loose_equals(b)),
        Opcode::Ne => Value::Boolean(!a.loose_equals(b)),
        Opcode::EqStrict => Value::Boolean(a.strict_equals(b)),
        Opcode::NeStrict => Value::Boolean(!a.strict_equals(b)),
        Opcode::In => Value::Boolean(b.has_property(&a.to_property_key())?),
        Opcode::InstanceOf => Value::Boolean(a.instance_of(b)?),
        other => return Err(not_an_operator(other)),
    })
}

/// `+`: string concatenation if either primitive is a string, else numeric.
fn add(a: &Value, b: &Value) -> Value {
    let a = a.to_primitive();
    let b = b.to_primitive();
    match (&a, &b) {
        (Value::String(x), y) => Value::String(format!("{}{}", x, y)),
        (x, Value::String(y)) => Value::String(format!("{}{}", x, y)),
        _ => Value::Number(a.to_number() + b.to_number()),
    }
}

/// Exponentiation with the evaluated language's NaN rules, which differ
/// from `powf` for `1 ** NaN` and `(-1) ** Infinity`.
fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        f64::NAN
    } else {
        base.powf(exponent)
    }
}

fn not_an_operator(op: Opcode) -> JsError {
    JsError::internal(format!("VM error: {} is not a value operator", op.name()))
}
