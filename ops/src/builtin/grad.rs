//! `elementwise_add_grad`: shape and type rules only.
//!
//! Gradients reach lowering only after a decomposition pass has rewritten
//! them into forward operators, so the strategy always fails.

use strata_dtype::DType;

use super::expect_shapes;
use crate::error::*;
use crate::infer::infer_grad_dtypes;
use crate::registry::{OpDescriptor, OpKind, OpPatternKind};
use crate::strategy::OpStrategy;

pub(crate) fn descriptor() -> OpDescriptor {
    OpDescriptor::builder()
        .name("elementwise_add_grad")
        .kind(OpKind::AddGrad)
        .num_inputs(3)
        .num_outputs(2)
        .pattern(OpPatternKind::Opaque)
        .description("gradient of elementwise_add")
        .build()
}

pub(crate) fn infer_shape(shapes: &[Vec<usize>]) -> Result<Vec<Vec<usize>>> {
    expect_shapes("gradient shape inference", 3, shapes)?;
    Ok(vec![shapes[1].clone(), shapes[2].clone()])
}

pub(crate) fn infer_dtype(types: &[DType]) -> Result<Vec<DType>> {
    infer_grad_dtypes(types)
}

pub(crate) fn strategy(op: &str) -> Result<OpStrategy> {
    GradientNotDecomposedSnafu { op }.fail()
}
