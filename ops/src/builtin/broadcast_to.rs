use super::expect_shapes;
use crate::attr::{AttrMap, BroadcastToConfig};
use crate::error::*;
use crate::kernel;
use crate::layout::{InferredLayouts, infer_broadcast_to_layout};
use crate::registry::{OpDescriptor, OpKind, OpPatternKind};
use crate::shape::broadcast_to_shape;
use crate::strategy::{OpStrategy, StrategyContext, assemble_strategy};

pub(crate) fn descriptor() -> OpDescriptor {
    OpDescriptor::builder()
        .name("broadcast_to")
        .kind(OpKind::BroadcastTo)
        .pattern(OpPatternKind::Broadcast)
        .description("broadcast one tensor to the target shape")
        .build()
}

pub(crate) fn infer_shape(shapes: &[Vec<usize>], attrs: &AttrMap) -> Result<Vec<Vec<usize>>> {
    expect_shapes("broadcast_to shape inference", 1, shapes)?;
    let config = BroadcastToConfig::from_attrs(attrs)?;
    Ok(vec![broadcast_to_shape(&shapes[0], &config.broadcast_axes, &config.out_shape)?])
}

pub(crate) fn infer_layout(layouts: &[String], attrs: &AttrMap) -> Result<InferredLayouts> {
    let out_layouts = attrs.str_list("out_layouts")?.map_or_else(|| vec![String::new()], <[String]>::to_vec);
    infer_broadcast_to_layout(layouts, &out_layouts)
}

pub(crate) fn strategy(attrs: &AttrMap, ctx: StrategyContext) -> Result<OpStrategy> {
    let config = BroadcastToConfig::from_attrs(attrs)?;
    Ok(assemble_strategy(ctx, 1, move |inputs, name| {
        Ok(vec![kernel::broadcast_to(&inputs[0], &config.out_shape, &config.broadcast_axes, name)?])
    }))
}
