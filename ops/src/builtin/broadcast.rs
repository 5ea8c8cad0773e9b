use snafu::ensure;
use strata_dtype::DType;
use strum::IntoEnumIterator;

use super::expect_shapes;
use crate::attr::{AttrMap, BroadcastConfig};
use crate::error::*;
use crate::infer::{DTypeRule, infer_dtype as infer_by_rule};
use crate::kernel::broadcast_binary;
use crate::primitive::BinaryPrimitive;
use crate::registry::{OpDescriptor, OpKind, OpPatternKind};
use crate::shape::broadcast_shape;
use crate::strategy::{OpStrategy, StrategyContext, assemble_strategy};

pub(crate) fn descriptors() -> Vec<OpDescriptor> {
    BinaryPrimitive::iter()
        .map(|primitive| {
            OpDescriptor::builder()
                .name(primitive.name())
                .kind(OpKind::Binary(primitive))
                .num_inputs(2)
                .pattern(OpPatternKind::Broadcast)
                .description(format!("{primitive} with broadcasting"))
                .build()
        })
        .collect()
}

pub(crate) fn infer_shape(shapes: &[Vec<usize>], attrs: &AttrMap) -> Result<Vec<Vec<usize>>> {
    expect_shapes("broadcast shape inference", 2, shapes)?;
    let config = BroadcastConfig::from_attrs(attrs)?;
    Ok(vec![broadcast_shape(&shapes[0], &shapes[1], config.axis)?])
}

pub(crate) fn infer_dtype(types: &[DType], primitive: BinaryPrimitive) -> Result<Vec<DType>> {
    let rule = if primitive.yields_bool() { DTypeRule::Bool } else { DTypeRule::SameAsFirst };
    let out = infer_by_rule(types, rule)?;
    if primitive.rejects_float() {
        for &dtype in types {
            ensure!(!dtype.is_float(), UnsupportedDtypeSnafu { operation: primitive.name(), dtype });
        }
    }
    Ok(vec![out])
}

pub(crate) fn strategy(primitive: BinaryPrimitive, attrs: &AttrMap, ctx: StrategyContext) -> Result<OpStrategy> {
    let config = BroadcastConfig::from_attrs(attrs)?;
    Ok(assemble_strategy(ctx, 2, move |inputs, name| {
        Ok(vec![broadcast_binary(&inputs[0], &inputs[1], primitive, config.axis, name)?])
    }))
}
