use strata_dtype::DType;
use strata_ir::shape::from_static;
use strata_ir::{BufferData, Tensor};
use strum::IntoEnumIterator;
use test_case::test_case;

use crate::error::Error;
use crate::kernel::broadcast_binary;
use crate::test::helpers::{input, run_host};
use crate::{AttrMap, BinaryPrimitive, registry};

fn f32s(name: &str, shape: &[usize], data: &[f32]) -> (Tensor, BufferData) {
    input(name, shape, BufferData::from_slice(data))
}

fn i32s(name: &str, shape: &[usize], data: &[i32]) -> (Tensor, BufferData) {
    input(name, shape, BufferData::from_slice(data))
}

#[test]
fn test_add_trailing_broadcast() {
    let a = f32s("a", &[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = f32s("b", &[3], &[10.0, 20.0, 30.0]);
    let (shape, out) = run_host("elementwise_add", &AttrMap::new(), &[a, b]);
    assert_eq!(shape, vec![2, 3]);
    assert_eq!(out.to_f64(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
}

#[test]
fn test_unit_dimensions_stretch() {
    let a = f32s("a", &[2, 1], &[1.0, 2.0]);
    let b = f32s("b", &[1, 3], &[10.0, 20.0, 30.0]);
    let (shape, out) = run_host("elementwise_mul", &AttrMap::new(), &[a, b]);
    assert_eq!(shape, vec![2, 3]);
    assert_eq!(out.to_f64(), vec![10.0, 20.0, 30.0, 20.0, 40.0, 60.0]);
}

#[test]
fn test_explicit_axis() {
    let a = f32s("a", &[2, 3, 2], &[0.0; 12]);
    let b = f32s("b", &[3], &[1.0, 2.0, 3.0]);
    let attrs = AttrMap::new().with("axis", 1i64);
    let (shape, out) = run_host("elementwise_add", &attrs, &[a, b]);
    assert_eq!(shape, vec![2, 3, 2]);
    assert_eq!(out.to_f64(), vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
}

#[test]
fn test_axis_minus_one_right_aligns() {
    let a = f32s("a", &[2, 2], &[1.0, 2.0, 3.0, 4.0]);
    let b = f32s("b", &[2], &[1.0, 1.0]);
    let (_, out) = run_host("substract", &AttrMap::new().with("axis", -1i64), &[a, b]);
    assert_eq!(out.to_f64(), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test_case("greater", vec![false, true, false] ; "greater")]
#[test_case("less_equal", vec![true, false, true] ; "less equal")]
#[test_case("equal", vec![false, false, true] ; "equal")]
#[test_case("not_equal", vec![true, true, false] ; "not equal")]
fn test_comparisons_yield_bool(op: &str, expected: Vec<bool>) {
    let a = i32s("a", &[3], &[1, 5, 2]);
    let b = i32s("b", &[1], &[2]);
    let (_, out) = run_host(op, &AttrMap::new(), &[a, b]);
    assert_eq!(out.dtype, DType::Bool);
    assert_eq!(out.to_bool(), expected);
}

#[test_case("floor_divide", vec![-4, 3, 3] ; "floor divide")]
#[test_case("floor_mod", vec![1, 1, -1] ; "floor mod")]
#[test_case("max", vec![2, 7, -2] ; "max")]
#[test_case("bitwise_and", vec![0, 2, -8] ; "bitwise and")]
fn test_integer_primitives(op: &str, expected: Vec<i64>) {
    let a = i32s("a", &[3], &[-7, 7, -7]);
    let b = i32s("b", &[3], &[2, 2, -2]);
    let (_, out) = run_host(op, &AttrMap::new(), &[a, b]);
    assert_eq!(out.dtype, DType::Int32);
    assert_eq!(out.to_i64().unwrap(), expected);
}

#[test_case("left_shift", vec![4, 12, -8] ; "left shift")]
#[test_case("right_shift", vec![0, 0, -1] ; "right shift")]
fn test_shifts(op: &str, expected: Vec<i64>) {
    let a = i32s("a", &[3], &[1, 3, -2]);
    let b = i32s("b", &[1], &[2]);
    let (_, out) = run_host(op, &AttrMap::new(), &[a, b]);
    assert_eq!(out.to_i64().unwrap(), expected);
}

#[test]
fn test_bitwise_rejects_float() {
    let a = Tensor::placeholder("a", DType::Float32, from_static(&[4]));
    let b = Tensor::placeholder("b", DType::Float32, from_static(&[4]));
    let err = broadcast_binary(&a, &b, BinaryPrimitive::BitwiseXor, None, "out").unwrap_err();
    assert_eq!(err, Error::UnsupportedDtype { operation: "bitwise_xor".into(), dtype: DType::Float32 });

    let err = registry().get("right_shift").unwrap().infer_dtype(&[DType::Float64, DType::Float64], &AttrMap::new());
    assert!(matches!(
        err,
        Err(Error::InOperator { source, .. }) if matches!(*source, Error::UnsupportedDtype { .. })
    ));
}

#[test]
fn test_incompatible_shapes() {
    let a = Tensor::placeholder("a", DType::Float32, from_static(&[2, 3]));
    let b = Tensor::placeholder("b", DType::Float32, from_static(&[4]));
    let err = broadcast_binary(&a, &b, BinaryPrimitive::ElementwiseAdd, None, "out").unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { lhs_dim: 3, rhs_dim: 4, .. }));
}

#[test]
fn test_every_primitive_is_registered() {
    for primitive in BinaryPrimitive::iter() {
        let desc = registry().get(primitive.name()).unwrap();
        assert_eq!(desc.num_inputs, 2, "{primitive}");
    }
    assert!(registry().contains("substract"));
    assert!(!registry().contains("subtract"));
}
