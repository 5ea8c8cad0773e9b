use strata_dtype::DType;
use strata_ir::shape::{from_static, to_static};
use strata_ir::{BufferData, Expr, ForKind, LoweredModule, Op, SInt, Shape, Tensor, lower_function, visit};
use strata_schedule::{IrSchedule, ScheduleConfig, Target, schedule_injective};
use test_case::test_case;

use crate::error::Error;
use crate::kernel::{ArgReduceKind, arg_reduce};
use crate::test::helpers::{input, run_host, run_op};
use crate::{AttrMap, registry};

fn matrix() -> (Tensor, BufferData) {
    input("x", &[2, 3], BufferData::from_slice(&[3.0f32, 1.0, 2.0, 5.0, 4.0, 6.0]))
}

fn attrs(axis: i64, keep_dim: bool) -> AttrMap {
    AttrMap::new().with("axis", axis).with("keep_dim", keep_dim)
}

#[test]
fn test_argmin_rows() {
    let (shape, out) = run_host("argmin", &attrs(1, false), &[matrix()]);
    assert_eq!(shape, vec![2]);
    assert_eq!(out.dtype, DType::Int32);
    assert_eq!(out.to_i64().unwrap(), vec![1, 1]);
}

#[test]
fn test_argmin_keep_dims() {
    let (shape, out) = run_host("argmin", &attrs(-1, true), &[matrix()]);
    assert_eq!(shape, vec![2, 1]);
    assert_eq!(out.to_i64().unwrap(), vec![1, 1]);
}

#[test]
fn test_argmin_columns() {
    let (shape, out) = run_host("argmin", &attrs(0, false), &[matrix()]);
    assert_eq!(shape, vec![3]);
    assert_eq!(out.to_i64().unwrap(), vec![0, 0, 0]);
}

#[test_case(1 ; "positive axis")]
#[test_case(-1 ; "negative axis")]
fn test_argmax_rows(axis: i64) {
    let (_, out) = run_host("argmax", &attrs(axis, false), &[matrix()]);
    assert_eq!(out.to_i64().unwrap(), vec![0, 2]);
}

#[test_case("argmin", &[2.0, 1.0, 1.0, 3.0], 1 ; "argmin first of ties")]
#[test_case("argmax", &[5.0, 5.0, 1.0, 0.0], 0 ; "argmax first of ties")]
#[test_case("argmin", &[4.0, 2.0, 9.0, -2.0], 3 ; "argmin last")]
fn test_fully_reduced(op: &str, data: &[f64], expected: i64) {
    let x = input("x", &[4], BufferData::from_slice(data));
    let (shape, out) = run_host(op, &attrs(0, false), &[x]);
    assert_eq!(shape, vec![1]);
    assert_eq!(out.to_i64().unwrap(), vec![expected]);
}

#[test]
fn test_integer_input() {
    let x = input("x", &[2, 2], BufferData::from_slice(&[-7i32, 3, 8, 8]));
    let (_, out) = run_host("argmax", &attrs(1, false), &[x]);
    assert_eq!(out.to_i64().unwrap(), vec![1, 0]);
}

#[test]
fn test_middle_axis() {
    // x[i][j][k] = (j * 5 + 7 * i + k) % 4 over shape [2, 3, 2]
    let data: Vec<i64> = (0..2)
        .flat_map(|i| (0..3).flat_map(move |j| (0..2).map(move |k| (j * 5 + 7 * i + k) % 4)))
        .collect();
    let x = input("x", &[2, 3, 2], BufferData::from_slice(&data));
    let (shape, out) = run_host("argmin", &attrs(1, false), &[x]);

    assert_eq!(shape, vec![2, 2]);
    let mut expected = Vec::new();
    for i in 0..2 {
        for k in 0..2 {
            let column: Vec<i64> = (0..3).map(|j| data[(i * 3 + j) * 2 + k]).collect();
            let min = *column.iter().min().unwrap();
            expected.push(column.iter().position(|&v| v == min).unwrap() as i64);
        }
    }
    assert_eq!(out.to_i64().unwrap(), expected);
}

#[test]
fn test_symbolic_dimension_rejected() {
    let n = SInt::from(Expr::var("n", DType::Index));
    let shape: Shape = [n, SInt::from(3)].into_iter().collect();
    let x = Tensor::placeholder("x", DType::Float32, shape);

    let err = arg_reduce(&x, ArgReduceKind::Min, 0, false, "out").unwrap_err();
    assert_eq!(err, Error::NonConstantShape { tensor: "x".into(), dim: 0 });
}

#[test_case(ArgReduceKind::Min ; "argmin")]
#[test_case(ArgReduceKind::Max ; "argmax")]
fn test_zero_length_axis_rejected(kind: ArgReduceKind) {
    let (x, _) = input("x", &[2, 0], BufferData::from_slice::<f32>(&[]));
    let err = arg_reduce(&x, kind, 1, false, "out").unwrap_err();
    assert_eq!(err, Error::EmptyReduction { operation: format!("arg{kind}"), axis: 1 });

    // Reducing the non-empty axis still works and yields an empty output.
    let out = arg_reduce(&x, kind, 0, false, "out").unwrap();
    assert_eq!(to_static(out.shape()).map(|dims| dims.to_vec()), Some(vec![0]));
}

#[test]
fn test_zero_length_axis_rejected_by_inference() {
    let desc = registry().get("argmin").unwrap();
    let err = desc.infer_shape(&[vec![2, 0]], &attrs(-1, false)).unwrap_err();
    let Error::InOperator { source, .. } = err else { panic!("expected operator error") };
    assert_eq!(*source, Error::EmptyReduction { operation: "arg reduce shape inference".into(), axis: 1 });
}

#[test]
fn test_axis_out_of_range() {
    let (x, _) = matrix();
    let err = arg_reduce(&x, ArgReduceKind::Max, 2, false, "out").unwrap_err();
    assert_eq!(err, Error::AxisOutOfRange { axis: 2, rank: 2 });
}

#[test]
fn test_scratch_buffers() {
    let (x, _) = matrix();
    let out = arg_reduce(&x, ArgReduceKind::Min, 1, false, "out").unwrap();
    let func = lower_function("argmin", &[out]).unwrap();

    let mut locals: Vec<_> = func.locals().iter().map(|t| (t.name().to_string(), t.dtype(), t.len())).collect();
    locals.sort();
    assert_eq!(locals, vec![
        ("out_min_index".to_string(), DType::Int32, Some(4)),
        ("out_min_value".to_string(), DType::Float32, Some(4)),
    ]);
    assert_eq!(func.args.len(), 2);
}

#[test_case(Target::host() ; "host")]
#[test_case(Target::nvgpu() ; "nvgpu")]
fn test_schedule_preserves_result(target: Target) {
    let data: Vec<f32> = (0..64).map(|v| ((v * 37) % 11) as f32).collect();
    let x = input("x", &[16, 4], BufferData::from_slice(&data));
    let config = ScheduleConfig::builder().parallel_min(1).cuda_threads(8).build();

    let (_, scheduled) = run_op("argmin", &attrs(1, false), &[x.clone()], &target, &config);
    let (_, plain) = run_op("argmin", &attrs(1, false), &[x], &Target::unknown(), &config);
    assert_eq!(scheduled, plain);
}

#[test]
fn test_fold_loop_not_vectorized() {
    let x = Tensor::placeholder("x", DType::Float32, from_static(&[16, 4]));
    let out = arg_reduce(&x, ArgReduceKind::Min, 1, false, "out").unwrap();
    let mut sch = IrSchedule::new(LoweredModule::new(vec![lower_function("argmin", &[out]).unwrap()]));
    let config = ScheduleConfig::builder().parallel_min(1).build();
    schedule_injective(&mut sch, &Target::host(), &config).unwrap();

    let mut kinds = Vec::new();
    visit::walk(&sch.module().functions[0].body, &mut |e| {
        if let Op::For { kind, .. } = e.op() {
            kinds.push(*kind);
        }
    });
    assert_eq!(kinds, vec![ForKind::Parallel, ForKind::Serial]);
}

/// Local buffers allocated directly under `loop_kind` loops.
fn scratch_under(func: &strata_ir::LoweredFunc, loop_kind: fn(&ForKind) -> bool) -> Vec<String> {
    let mut names = Vec::new();
    visit::walk(&func.body, &mut |e| {
        if let Op::For { kind, body, .. } = e.op()
            && loop_kind(kind)
        {
            visit::walk(body, &mut |inner| {
                if let Op::Allocate { buffer, .. } = inner.op() {
                    names.push(buffer.name().to_string());
                }
            });
        }
    });
    names.sort();
    names.dedup();
    names
}

#[test_case(Target::host(), |k: &ForKind| *k == ForKind::Parallel ; "parallel cpu loop")]
#[test_case(Target::nvgpu(), |k: &ForKind| k.is_gpu_bound() ; "gpu bound loop")]
fn test_scratch_private_to_concurrent_iterations(target: Target, concurrent: fn(&ForKind) -> bool) {
    let x = Tensor::placeholder("x", DType::Float32, from_static(&[16, 4]));
    let out = arg_reduce(&x, ArgReduceKind::Min, 1, false, "out").unwrap();
    let mut sch = IrSchedule::new(LoweredModule::new(vec![lower_function("argmin", &[out]).unwrap()]));
    let config = ScheduleConfig::builder().parallel_min(1).cuda_threads(8).build();
    schedule_injective(&mut sch, &target, &config).unwrap();

    let func = &sch.module().functions[0];
    assert_eq!(scratch_under(func, concurrent), vec!["out_min_index", "out_min_value"]);
    let rendered = func.to_string();
    let first_loop = rendered.find("for (").unwrap();
    assert!(rendered.find("float out_min_value[5];").unwrap() > first_loop, "{rendered}");
}
