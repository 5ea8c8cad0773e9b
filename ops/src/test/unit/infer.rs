use strata_dtype::DType;
use test_case::test_case;

use crate::error::Error;
use crate::infer::{DTypeRule, infer_dtype, infer_grad_dtypes};
use crate::{AttrMap, registry};

#[test_case(DTypeRule::SameAsFirst, DType::Float16)]
#[test_case(DTypeRule::Bool, DType::Bool)]
#[test_case(DTypeRule::Int32, DType::Int32)]
fn test_rules(rule: DTypeRule, expected: DType) {
    assert_eq!(infer_dtype(&[DType::Float16, DType::Float32], rule).unwrap(), expected);
}

#[test]
fn test_empty_input_type() {
    assert_eq!(infer_dtype(&[], DTypeRule::SameAsFirst).unwrap_err(), Error::EmptyInputType);
}

#[test_case("greater")]
#[test_case("less")]
#[test_case("equal")]
#[test_case("not_equal")]
#[test_case("greater_equal")]
#[test_case("less_equal")]
#[test_case("logical_and")]
#[test_case("logical_xor")]
fn test_comparators_yield_bool(op: &str) {
    let out = registry().get(op).unwrap().infer_dtype(&[DType::Float32, DType::Float32], &AttrMap::new()).unwrap();
    assert_eq!(out, vec![DType::Bool]);
}

#[test_case("elementwise_add", DType::Float32)]
#[test_case("power", DType::Float64)]
#[test_case("left_shift", DType::Int16)]
#[test_case("reciprocal", DType::Float16)]
#[test_case("broadcast_to", DType::UInt8)]
fn test_same_as_first(op: &str, dtype: DType) {
    let out = registry().get(op).unwrap().infer_dtype(&[dtype, dtype], &AttrMap::new()).unwrap();
    assert_eq!(out, vec![dtype]);
}

#[test]
fn test_arg_reduce_yields_int32() {
    for op in ["argmin", "argmax"] {
        let out = registry().get(op).unwrap().infer_dtype(&[DType::Float64], &AttrMap::new()).unwrap();
        assert_eq!(out, vec![DType::Int32]);
    }
}

#[test]
fn test_bitwise_rejects_float() {
    let err = registry().get("bitwise_and").unwrap().infer_dtype(&[DType::Float32, DType::Float32], &AttrMap::new());
    let Err(Error::InOperator { op, source }) = err else { panic!("expected operator error") };
    assert_eq!(op, "bitwise_and");
    assert_eq!(*source, Error::UnsupportedDtype { operation: "bitwise_and".into(), dtype: DType::Float32 });
}

#[test]
fn test_grad_dtypes() {
    assert_eq!(infer_grad_dtypes(&[DType::Float32, DType::Float16, DType::Float64]).unwrap(), vec![
        DType::Float16,
        DType::Float64
    ]);
    assert!(matches!(infer_grad_dtypes(&[DType::Float32]), Err(Error::ArityMismatch { expected: 3, actual: 1, .. })));
}
