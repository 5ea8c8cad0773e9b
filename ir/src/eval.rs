//! Constant evaluation of expression operations.
//!
//! Shared by constant folding in the smart constructors and by the reference
//! interpreter, so folded and interpreted results can never diverge.

use strata_dtype::DType;

use crate::types::{BinaryOp, ConstValue, UnaryOp};

/// Evaluate a unary operation and normalize the result to `dtype`.
///
/// Returns `None` when the operation is undefined for the value.
pub fn eval_unary_op(op: UnaryOp, v: ConstValue, dtype: DType) -> Option<ConstValue> {
    let raw = match op {
        UnaryOp::Neg => eval_neg(v),
        UnaryOp::Not => Some(ConstValue::Bool(!v.is_truthy())),
        UnaryOp::Floor => eval_floor(v),
    }?;
    raw.cast(dtype)
}

/// Evaluate a binary operation on operands of the same dtype.
///
/// `dtype` is the result dtype (`Bool` for comparisons and logical
/// operations). Integer arithmetic wraps at the width of `dtype`. Returns
/// `None` for integer division by zero or mismatched operand kinds.
pub fn eval_binary_op(op: BinaryOp, a: ConstValue, b: ConstValue, dtype: DType) -> Option<ConstValue> {
    let raw = match op {
        BinaryOp::Add => eval_add(a, b),
        BinaryOp::Sub => eval_sub(a, b),
        BinaryOp::Mul => eval_mul(a, b),
        BinaryOp::Div => eval_div(a, b),
        BinaryOp::FloorDiv => eval_floor_div(a, b),
        BinaryOp::Mod => eval_mod(a, b),
        BinaryOp::FloorMod => eval_floor_mod(a, b),
        BinaryOp::Max => eval_max(a, b),
        BinaryOp::Min => eval_min(a, b),
        BinaryOp::Pow => eval_pow(a, b),
        BinaryOp::And => eval_and(a, b),
        BinaryOp::Or => eval_or(a, b),
        BinaryOp::Xor => eval_xor(a, b),
        BinaryOp::Shl => eval_shl(a, b),
        BinaryOp::Shr => eval_shr(a, b),
        BinaryOp::LogicalAnd => Some(ConstValue::Bool(a.is_truthy() && b.is_truthy())),
        BinaryOp::LogicalOr => Some(ConstValue::Bool(a.is_truthy() || b.is_truthy())),
        BinaryOp::LogicalXor => Some(ConstValue::Bool(a.is_truthy() != b.is_truthy())),
        BinaryOp::Lt => Some(ConstValue::Bool(compare(a, b).is_some_and(|o| o.is_lt()))),
        BinaryOp::Le => Some(ConstValue::Bool(compare(a, b).is_some_and(|o| o.is_le()))),
        BinaryOp::Gt => Some(ConstValue::Bool(compare(a, b).is_some_and(|o| o.is_gt()))),
        BinaryOp::Ge => Some(ConstValue::Bool(compare(a, b).is_some_and(|o| o.is_ge()))),
        BinaryOp::Eq => Some(ConstValue::Bool(compare(a, b).is_some_and(|o| o.is_eq()))),
        BinaryOp::Ne => Some(ConstValue::Bool(!compare(a, b).is_some_and(|o| o.is_eq()))),
    }?;
    raw.cast(dtype)
}

// ============================================================================
// Unary Operations
// ============================================================================

#[inline]
fn eval_neg(v: ConstValue) -> Option<ConstValue> {
    match v {
        ConstValue::Int(x) => Some(ConstValue::Int(x.wrapping_neg())),
        ConstValue::UInt(x) => Some(ConstValue::UInt(x.wrapping_neg())),
        ConstValue::Float(x) => Some(ConstValue::Float(-x)),
        ConstValue::Bool(_) => None,
    }
}

#[inline]
fn eval_floor(v: ConstValue) -> Option<ConstValue> {
    match v {
        ConstValue::Float(x) => Some(ConstValue::Float(x.floor())),
        ConstValue::Int(_) | ConstValue::UInt(_) => Some(v),
        ConstValue::Bool(_) => None,
    }
}

// ============================================================================
// Binary Arithmetic Operations
// ============================================================================

/// Promote bools to integers so arithmetic on `Bool` follows C.
#[inline]
fn numeric(v: ConstValue) -> ConstValue {
    match v {
        ConstValue::Bool(b) => ConstValue::Int(b as i64),
        other => other,
    }
}

macro_rules! arith {
    ($name:ident, $int:ident, $float:tt) => {
        #[inline]
        fn $name(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
            match (numeric(a), numeric(b)) {
                (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.$int(y))),
                (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x.$int(y))),
                (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x $float y)),
                _ => None,
            }
        }
    };
}

arith!(eval_add, wrapping_add, +);
arith!(eval_sub, wrapping_sub, -);
arith!(eval_mul, wrapping_mul, *);

#[inline]
fn eval_div(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(_), ConstValue::Int(0)) | (ConstValue::UInt(_), ConstValue::UInt(0)) => None,
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.wrapping_div(y))),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x / y)),
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x / y)),
        _ => None,
    }
}

#[inline]
fn eval_floor_div(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(_), ConstValue::Int(0)) | (ConstValue::UInt(_), ConstValue::UInt(0)) => None,
        (ConstValue::Int(x), ConstValue::Int(y)) => {
            let q = x.wrapping_div(y);
            // Truncation rounds toward zero; step down when signs differ and there is a remainder.
            let adjust = (x.wrapping_rem(y) != 0) && ((x < 0) != (y < 0));
            Some(ConstValue::Int(if adjust { q - 1 } else { q }))
        }
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x / y)),
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float((x / y).floor())),
        _ => None,
    }
}

#[inline]
fn eval_mod(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(_), ConstValue::Int(0)) | (ConstValue::UInt(_), ConstValue::UInt(0)) => None,
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.wrapping_rem(y))),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x % y)),
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x % y)),
        _ => None,
    }
}

#[inline]
fn eval_floor_mod(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(_), ConstValue::Int(0)) | (ConstValue::UInt(_), ConstValue::UInt(0)) => None,
        (ConstValue::Int(x), ConstValue::Int(y)) => {
            let r = x.wrapping_rem(y);
            Some(ConstValue::Int(if r != 0 && ((r < 0) != (y < 0)) { r + y } else { r }))
        }
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x % y)),
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x - y * (x / y).floor())),
        _ => None,
    }
}

#[inline]
fn eval_max(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.max(y))),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x.max(y))),
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x.max(y))),
        _ => None,
    }
}

#[inline]
fn eval_min(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.min(y))),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x.min(y))),
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x.min(y))),
        _ => None,
    }
}

#[inline]
fn eval_pow(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(x), ConstValue::Int(y)) => match u32::try_from(y) {
            Ok(e) => Some(ConstValue::Int(x.wrapping_pow(e))),
            // Negative exponents truncate toward zero like C integer division.
            Err(_) => Some(ConstValue::Int(match x {
                1 => 1,
                -1 if y % 2 == 0 => 1,
                -1 => -1,
                0 => return None,
                _ => 0,
            })),
        },
        (ConstValue::UInt(x), ConstValue::UInt(y)) => {
            Some(ConstValue::UInt(x.wrapping_pow(u32::try_from(y).unwrap_or(u32::MAX))))
        }
        (ConstValue::Float(x), ConstValue::Float(y)) => Some(ConstValue::Float(x.powf(y))),
        _ => None,
    }
}

// ============================================================================
// Bitwise Operations
// ============================================================================

macro_rules! bitwise {
    ($name:ident, $op:tt) => {
        #[inline]
        fn $name(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
            match (a, b) {
                (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x $op y)),
                (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x $op y)),
                (ConstValue::Bool(x), ConstValue::Bool(y)) => Some(ConstValue::Bool(x $op y)),
                _ => None,
            }
        }
    };
}

bitwise!(eval_and, &);
bitwise!(eval_or, |);
bitwise!(eval_xor, ^);

#[inline]
fn eval_shl(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.wrapping_shl(y as u32))),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x.wrapping_shl(y as u32))),
        _ => None,
    }
}

#[inline]
fn eval_shr(a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(ConstValue::Int(x.wrapping_shr(y as u32))),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(ConstValue::UInt(x.wrapping_shr(y as u32))),
        _ => None,
    }
}

// ============================================================================
// Comparison Operations
// ============================================================================

/// Ordering of two operands of the same kind. `None` for NaN, so every ordered comparison with NaN is false.
#[inline]
fn compare(a: ConstValue, b: ConstValue) -> Option<std::cmp::Ordering> {
    match (numeric(a), numeric(b)) {
        (ConstValue::Int(x), ConstValue::Int(y)) => Some(x.cmp(&y)),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => Some(x.cmp(&y)),
        (ConstValue::Float(x), ConstValue::Float(y)) => x.partial_cmp(&y),
        _ => None,
    }
}
