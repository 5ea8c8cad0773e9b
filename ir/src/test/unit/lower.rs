use strata_dtype::DType;

use crate::error::Error;
use crate::shape::from_static;
use crate::{ArgKind, Buffer, ConstValue, Expr, ForKind, Op, Tensor, lower_function, visit};

fn add_bias() -> (Tensor, Tensor, Tensor) {
    let a = Tensor::placeholder("a", DType::Float32, from_static(&[2, 3]));
    let b = Tensor::placeholder("b", DType::Float32, from_static(&[3]));
    let c = Tensor::compute("c", from_static(&[2, 3]), |i| a.at(i)?.try_add(&b.at(&i[1..])?)).unwrap();
    (a, b, c)
}

#[test]
fn test_arguments_follow_first_use() {
    let (_, _, c) = add_bias();
    let func = lower_function("add_bias", &[c]).unwrap();

    let names: Vec<_> = func.args.iter().map(|a| (a.buffer.name().to_string(), a.kind)).collect();
    assert_eq!(
        names,
        vec![("a".into(), ArgKind::Input), ("b".into(), ArgKind::Input), ("c".into(), ArgKind::Output)]
    );
    assert!(func.locals().is_empty());
}

#[test]
fn test_loop_nest_matches_output_rank() {
    let (_, _, c) = add_bias();
    let func = lower_function("add_bias", &[c]).unwrap();

    let Op::For { extent, kind, body, .. } = func.body.op() else { panic!("expected outer loop") };
    assert_eq!(extent.as_const(), Some(ConstValue::Int(2)));
    assert_eq!(*kind, ForKind::Serial);
    let Op::For { extent, body, .. } = body.op() else { panic!("expected inner loop") };
    assert_eq!(extent.as_const(), Some(ConstValue::Int(3)));
    assert!(matches!(body.op(), Op::Store { .. }));
}

#[test]
fn test_lowered_body_has_no_tensor_reads() {
    let (a, _, c) = add_bias();
    let d = Tensor::compute("d", c.shape().clone(), |i| c.at(i)?.try_mul(&a.at(i)?)).unwrap();
    let func = lower_function("fused", &[d]).unwrap();

    let mut tensor_reads = 0;
    visit::walk(&func.body, &mut |e| tensor_reads += matches!(e.op(), Op::TensorLoad { .. }) as usize);
    assert_eq!(tensor_reads, 0);
    // `c` is inlined, so only placeholders remain as inputs.
    assert_eq!(func.inputs().map(|b| b.name()).collect::<Vec<_>>(), vec!["a", "b"]);
}

fn scratch_output() -> Tensor {
    let acc = Buffer::local("acc", DType::Int32, 2);
    Tensor::compute("out", from_static(&[4]), |i| {
        let init = Expr::try_store(&acc, &Expr::index(0), &Expr::cast(&i[0], DType::Int32))?;
        let read = Expr::try_load(&acc, &Expr::index(0))?;
        Ok::<_, Error>(Expr::sequence(&init, &read))
    })
    .unwrap()
}

#[test]
fn test_local_buffers_allocated_per_element() {
    let func = lower_function("scratch", &[scratch_output()]).unwrap();
    let locals = func.locals();
    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].name(), "acc");

    // The allocation sits inside the output loop, wrapping the store.
    let Op::For { body, .. } = func.body.op() else { panic!("expected output loop") };
    let Op::Allocate { buffer, body } = body.op() else { panic!("expected allocation inside the loop, got {body:?}") };
    assert_eq!(buffer.name(), "acc");
    assert!(matches!(body.op(), Op::Store { .. }));
}

#[test]
fn test_local_buffer_rendered_inside_loop() {
    let func = lower_function("scratch", &[scratch_output()]).unwrap();
    let expected = "\
void scratch(int32_t* out) {
  for (i0 = 0; i0 < 0 + 4; i0++) {
    int32_t acc[2];
    acc[0] = (int32_t)i0;
    out[i0] = acc[0];
  }
}";
    assert_eq!(func.to_string(), expected);
}

#[test]
fn test_allocate_requires_local_buffer() {
    let global = Buffer::new("g", DType::Int32, from_static(&[2]), crate::MemScope::Global);
    let body = Expr::try_store(&global, &Expr::index(0), &Expr::constant(ConstValue::Int(1), DType::Int32)).unwrap();
    assert_eq!(Expr::allocate(&global, &body).unwrap_err(), Error::NotLocalBuffer { buffer: "g".into() });
}

#[test]
fn test_scalar_output_stores_at_zero() {
    let out = Tensor::compute("out", from_static(&[]), |_| Ok::<_, Error>(Expr::constant(ConstValue::Int(3), DType::Int32)))
        .unwrap();
    let func = lower_function("scalar", &[out]).unwrap();
    let Op::Store { index, .. } = func.body.op() else { panic!("expected bare store") };
    assert_eq!(index.as_const(), Some(ConstValue::Int(0)));
}

#[test]
fn test_placeholder_output_rejected() {
    let a = Tensor::placeholder("a", DType::Float32, from_static(&[2]));
    let err = lower_function("bad", &[a]).unwrap_err();
    assert_eq!(err, Error::PlaceholderOutput { tensor: "a".into() });
    assert_eq!(lower_function("empty", &[]).unwrap_err(), Error::NoOutputs { function: "empty".into() });
}

#[test]
fn test_multiple_outputs_make_a_block() {
    let (a, _, c) = add_bias();
    let neg = Tensor::compute("neg", a.shape().clone(), |i| {
        Expr::try_unary(crate::UnaryOp::Neg, &a.at(i)?)
    })
    .unwrap();
    let func = lower_function("two", &[c, neg]).unwrap();
    assert_eq!(func.statements().len(), 2);
    assert_eq!(func.outputs().count(), 2);
    assert!(func.statements().iter().all(|s| matches!(s.op(), Op::For { .. })));
}

#[test]
fn test_pretty_print() {
    let (_, _, c) = add_bias();
    let func = lower_function("add_bias", &[c]).unwrap();
    let expected = "\
void add_bias(const float* a, const float* b, float* c) {
  for (i0 = 0; i0 < 0 + 2; i0++) {
    for (i1 = 0; i1 < 0 + 3; i1++) {
      c[((i0 * 3) + i1)] = (a[((i0 * 3) + i1)] + b[i1]);
    }
  }
}";
    assert_eq!(func.to_string(), expected);
}
