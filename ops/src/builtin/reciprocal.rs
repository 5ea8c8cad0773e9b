use snafu::ensure;

use super::expect_shapes;
use crate::error::*;
use crate::kernel;
use crate::registry::{OpDescriptor, OpKind, OpPatternKind};
use crate::strategy::{OpStrategy, StrategyContext, assemble_strategy};

pub(crate) fn descriptor() -> OpDescriptor {
    OpDescriptor::builder()
        .name("reciprocal")
        .kind(OpKind::Reciprocal)
        .pattern(OpPatternKind::ElementWise)
        .description("elementwise 1 / x")
        .build()
}

pub(crate) fn infer_shape(shapes: &[Vec<usize>]) -> Result<Vec<Vec<usize>>> {
    expect_shapes("reciprocal shape inference", 1, shapes)?;
    ensure!(!shapes[0].is_empty(), EmptyInputShapeSnafu { operation: "reciprocal shape inference" });
    Ok(vec![shapes[0].clone()])
}

pub(crate) fn strategy(ctx: StrategyContext) -> Result<OpStrategy> {
    let target = ctx.target.clone();
    Ok(assemble_strategy(ctx, 1, move |inputs, name| Ok(vec![kernel::reciprocal(&inputs[0], &target, name)?])))
}
