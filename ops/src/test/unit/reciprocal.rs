use strata_dtype::DType;
use strata_ir::shape::from_static;
use strata_ir::{BufferData, Op, Tensor, TensorKind};
use strata_schedule::{ScheduleConfig, Target};
use test_case::test_case;

use crate::error::Error;
use crate::kernel::reciprocal;
use crate::test::helpers::{input, run_host, run_op};
use crate::{AttrMap, registry};

fn extern_name(tensor: &Tensor) -> String {
    let TensorKind::Compute { body, .. } = tensor.kind() else { panic!("expected a compute tensor") };
    let Op::CallExtern { name, .. } = body.op() else { panic!("expected an extern call, got {body:?}") };
    name.clone()
}

#[test]
fn test_values() {
    let x = input("x", &[2, 2], BufferData::from_slice(&[1.0f32, 2.0, 4.0, 0.5]));
    let (shape, out) = run_host("reciprocal", &AttrMap::new(), &[x]);
    assert_eq!(shape, vec![2, 2]);
    assert_eq!(out.dtype, DType::Float32);
    assert_eq!(out.to_f64(), vec![1.0, 0.5, 0.25, 2.0]);
}

#[test]
fn test_on_gpu() {
    let x = input("x", &[4], BufferData::from_slice(&[8.0f64, -4.0, 0.125, 1.0]));
    let (_, out) = run_op("reciprocal", &AttrMap::new(), &[x], &Target::nvgpu(), &ScheduleConfig::default());
    assert_eq!(out.to_f64(), vec![0.125, -0.25, 8.0, 1.0]);
}

#[test_case(Target::host(), DType::Float32, "strata_host_reciprocal_fp32" ; "host fp32")]
#[test_case(Target::nvgpu(), DType::Float32, "strata_cuda_reciprocal_fp32" ; "cuda fp32")]
#[test_case(Target::nvgpu(), DType::Float16, "strata_cuda_reciprocal_fp16" ; "cuda fp16")]
#[test_case(Target::unknown(), DType::Float64, "strata_host_reciprocal_fp64" ; "unknown falls back to host")]
fn test_extern_symbol(target: Target, dtype: DType, expected: &str) {
    let x = Tensor::placeholder("x", dtype, from_static(&[8]));
    let out = reciprocal(&x, &target, "out").unwrap();
    assert_eq!(extern_name(&out), expected);
    assert_eq!(out.dtype(), dtype);
}

#[test_case(DType::Int32 ; "int32")]
#[test_case(DType::BFloat16 ; "bfloat16")]
#[test_case(DType::Bool ; "bool")]
fn test_unsupported_dtype(dtype: DType) {
    let x = Tensor::placeholder("x", dtype, from_static(&[8]));
    let err = reciprocal(&x, &Target::host(), "out").unwrap_err();
    assert_eq!(err, Error::UnsupportedDtype { operation: "reciprocal".into(), dtype });
}

#[test]
fn test_scalar_input_rejected() {
    let desc = registry().get("reciprocal").unwrap();
    let err = desc.infer_shape(&[vec![]], &AttrMap::new()).unwrap_err();
    let Error::InOperator { source, .. } = err else { panic!("expected operator error") };
    assert!(matches!(*source, Error::EmptyInputShape { .. }));

    let err = desc.infer_shape(&[], &AttrMap::new()).unwrap_err();
    let Error::InOperator { source, .. } = err else { panic!("expected operator error") };
    assert!(matches!(*source, Error::ArityMismatch { expected: 1, actual: 0, .. }));
}

#[test]
fn test_extra_input_shape_rejected() {
    let desc = registry().get("reciprocal").unwrap();
    let err = desc.infer_shape(&[vec![2], vec![2]], &AttrMap::new()).unwrap_err();
    let Error::InOperator { source, .. } = err else { panic!("expected operator error") };
    assert!(matches!(*source, Error::ArityMismatch { expected: 1, actual: 2, .. }));
}
