use std::sync::Arc;

use strata_dtype::DType;
use test_case::test_case;

use crate::error::Error;
use crate::{BinaryOp, Buffer, ConstValue, Expr, ForKind, Op, UnaryOp};

fn int32(v: i64) -> Arc<Expr> {
    Expr::constant(ConstValue::Int(v), DType::Int32)
}

fn f32c(v: f64) -> Arc<Expr> {
    Expr::constant(ConstValue::Float(v), DType::Float32)
}

// =============================================================================
// Constant folding
// =============================================================================

#[test_case(BinaryOp::Add, 7, 5, ConstValue::Int(12); "add")]
#[test_case(BinaryOp::Sub, 5, 7, ConstValue::Int(-2); "sub")]
#[test_case(BinaryOp::Div, -7, 2, ConstValue::Int(-3); "div_truncates")]
#[test_case(BinaryOp::FloorDiv, -7, 2, ConstValue::Int(-4); "floor_div_rounds_down")]
#[test_case(BinaryOp::Mod, -7, 2, ConstValue::Int(-1); "mod_follows_dividend")]
#[test_case(BinaryOp::FloorMod, -7, 2, ConstValue::Int(1); "floor_mod_follows_divisor")]
#[test_case(BinaryOp::Pow, 3, 4, ConstValue::Int(81); "pow")]
#[test_case(BinaryOp::Shl, 1, 5, ConstValue::Int(32); "shl")]
#[test_case(BinaryOp::Lt, 1, 2, ConstValue::Bool(true); "lt")]
#[test_case(BinaryOp::Ge, 1, 2, ConstValue::Bool(false); "ge")]
#[test_case(BinaryOp::LogicalXor, 1, 0, ConstValue::Bool(true); "logical_xor")]
fn test_int32_folding(op: BinaryOp, a: i64, b: i64, expected: ConstValue) {
    let folded = Expr::try_binary(op, &int32(a), &int32(b)).unwrap();
    assert_eq!(folded.as_const(), Some(expected));
}

#[test]
fn test_int32_folding_wraps() {
    let folded = int32(i32::MAX as i64).try_add(&int32(1)).unwrap();
    assert_eq!(folded.as_const(), Some(ConstValue::Int(i32::MIN as i64)));
}

#[test]
fn test_comparison_yields_bool() {
    let x = Expr::var("x", DType::Float32);
    let cmp = x.try_gt(&f32c(0.5)).unwrap();
    assert_eq!(cmp.dtype(), DType::Bool);
    assert!(matches!(cmp.op(), Op::Binary(BinaryOp::Gt, _, _)));
}

#[test]
fn test_not_yields_bool() {
    let x = Expr::var("x", DType::Int32);
    assert_eq!(Expr::try_unary(UnaryOp::Not, &x).unwrap().dtype(), DType::Bool);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_dtype_mismatch() {
    let err = int32(1).try_add(&f32c(1.0)).unwrap_err();
    assert_eq!(err, Error::DTypeMismatch { lhs: DType::Int32, rhs: DType::Float32 });
}

#[test]
fn test_bitwise_rejects_float() {
    let err = Expr::try_binary(BinaryOp::And, &f32c(1.0), &f32c(2.0)).unwrap_err();
    assert!(matches!(err, Error::InvalidDTypeForBinaryOp { operation: BinaryOp::And, .. }));
}

#[test]
fn test_integer_division_by_constant_zero() {
    let x = Expr::var("x", DType::Int32);
    assert_eq!(x.try_div(&int32(0)).unwrap_err(), Error::DivisionByZero);
    assert_eq!(Expr::try_binary(BinaryOp::FloorMod, &x, &int32(0)).unwrap_err(), Error::DivisionByZero);
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    let folded = f32c(1.0).try_div(&f32c(0.0)).unwrap();
    assert_eq!(folded.as_const(), Some(ConstValue::Float(f64::INFINITY)));
}

#[test]
fn test_select_requires_bool_condition() {
    let err = Expr::try_select(&int32(1), &int32(2), &int32(3)).unwrap_err();
    assert_eq!(err, Error::ConditionNotBool { actual: DType::Int32 });
}

#[test]
fn test_select_folds_constant_condition() {
    let cond = Expr::constant(ConstValue::Bool(false), DType::Bool);
    let (a, b) = (Expr::var("a", DType::Int32), Expr::var("b", DType::Int32));
    assert!(Arc::ptr_eq(&Expr::try_select(&cond, &a, &b).unwrap(), &b));
}

#[test]
fn test_store_type_must_match_buffer() {
    let buffer = Buffer::local("acc", DType::Float32, 4);
    let err = Expr::try_store(&buffer, &Expr::index(0), &int32(1)).unwrap_err();
    assert!(matches!(err, Error::StoreTypeMismatch { expected: DType::Float32, actual: DType::Int32, .. }));
}

#[test]
fn test_load_requires_integer_index() {
    let buffer = Buffer::local("acc", DType::Float32, 4);
    let err = Expr::try_load(&buffer, &f32c(0.0)).unwrap_err();
    assert_eq!(err, Error::IndexTypeMismatch { actual: DType::Float32 });
}

#[test]
fn test_void_operand_rejected() {
    let buffer = Buffer::local("acc", DType::Int32, 1);
    let store = Expr::try_store(&buffer, &Expr::index(0), &int32(1)).unwrap();
    assert_eq!(store.try_add(&store).unwrap_err(), Error::VoidTypeInOp);
}

// =============================================================================
// Index identities
// =============================================================================

#[test]
fn test_index_identities() {
    let i = Expr::var("i", DType::Index);
    assert!(Arc::ptr_eq(&i.try_add(&Expr::index(0)).unwrap(), &i));
    assert!(Arc::ptr_eq(&Expr::index(1).try_mul(&i).unwrap(), &i));
    assert!(Arc::ptr_eq(&i.try_div(&Expr::index(1)).unwrap(), &i));
    assert_eq!(i.try_mul(&Expr::index(0)).unwrap().as_const(), Some(ConstValue::Int(0)));
    assert_eq!(i.try_mod(&Expr::index(1)).unwrap().as_const(), Some(ConstValue::Int(0)));
}

#[test]
fn test_identities_only_apply_to_index() {
    let x = Expr::var("x", DType::Int32);
    let sum = x.try_add(&int32(0)).unwrap();
    assert!(matches!(sum.op(), Op::Binary(BinaryOp::Add, _, _)));
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_single_statement_block_unwraps() {
    let buffer = Buffer::local("acc", DType::Int32, 1);
    let store = Expr::try_store(&buffer, &Expr::index(0), &int32(1)).unwrap();
    assert!(Arc::ptr_eq(&Expr::block(vec![store.clone()]), &store));
}

#[test]
fn test_for_loop_is_void() {
    let i = Expr::var("i", DType::Index);
    let buffer = Buffer::local("acc", DType::Int32, 4);
    let store = Expr::try_store(&buffer, &i, &int32(1)).unwrap();
    let nest = Expr::for_loop(&i, &Expr::index(0), &Expr::index(4), ForKind::Serial, &store).unwrap();
    assert_eq!(nest.dtype(), DType::Void);
    assert_eq!(nest.to_string(), "for (i = 0; i < 0 + 4; i++) {\n  acc[i] = 1;\n}");
}
