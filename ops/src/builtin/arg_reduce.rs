use snafu::ensure;
use strata_dtype::DType;

use super::expect_shapes;
use crate::attr::{AttrMap, ArgReduceConfig};
use crate::error::*;
use crate::infer::{DTypeRule, infer_dtype as infer_by_rule};
use crate::kernel::{ArgReduceKind, arg_reduce};
use crate::registry::{OpDescriptor, OpKind, OpPatternKind};
use crate::shape::{normalize_axis, reduce_shape};
use crate::strategy::{OpStrategy, StrategyContext, assemble_strategy};

pub(crate) fn descriptors() -> Vec<OpDescriptor> {
    [ArgReduceKind::Min, ArgReduceKind::Max]
        .into_iter()
        .map(|kind| {
            OpDescriptor::builder()
                .name(format!("arg{kind}"))
                .kind(OpKind::ArgReduce(kind))
                .pattern(OpPatternKind::Reduction)
                .description(format!("index of the {kind}imum along one axis"))
                .build()
        })
        .collect()
}

pub(crate) fn infer_shape(shapes: &[Vec<usize>], attrs: &AttrMap) -> Result<Vec<Vec<usize>>> {
    expect_shapes("arg reduce shape inference", 1, shapes)?;
    ensure!(!shapes[0].is_empty(), EmptyInputShapeSnafu { operation: "arg reduce shape inference" });
    let config = ArgReduceConfig::from_attrs(attrs)?;
    let axis = normalize_axis(config.axis, shapes[0].len())?;
    ensure!(shapes[0][axis] > 0, EmptyReductionSnafu { operation: "arg reduce shape inference", axis });
    Ok(vec![reduce_shape(&shapes[0], config.axis, config.keep_dims)?])
}

pub(crate) fn infer_dtype(types: &[DType]) -> Result<Vec<DType>> {
    Ok(vec![infer_by_rule(types, DTypeRule::Int32)?])
}

pub(crate) fn strategy(kind: ArgReduceKind, attrs: &AttrMap, ctx: StrategyContext) -> Result<OpStrategy> {
    let config = ArgReduceConfig::from_attrs(attrs)?;
    Ok(assemble_strategy(ctx, 1, move |inputs, name| {
        Ok(vec![arg_reduce(&inputs[0], kind, config.axis, config.keep_dims, name)?])
    }))
}
