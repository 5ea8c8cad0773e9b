use snafu::{ResultExt, ensure};
use strata_ir::{Expr, Tensor};
use tracing::debug;

use super::broadcast_indices;
use crate::error::*;
use crate::primitive::BinaryPrimitive;
use crate::shape::{broadcast_offsets, broadcast_shape, static_dims, to_sint};

/// `out[i] = primitive(a[i'], b[i''])` with `a` and `b` broadcast to the common shape.
pub fn broadcast_binary(
    a: &Tensor,
    b: &Tensor,
    primitive: BinaryPrimitive,
    axis: Option<i64>,
    name: &str,
) -> Result<Tensor> {
    for input in [a, b] {
        ensure!(
            !(primitive.rejects_float() && input.dtype().is_float()),
            UnsupportedDtypeSnafu { operation: primitive.name(), dtype: input.dtype() }
        );
    }
    let (a_dims, b_dims) = (static_dims(a)?, static_dims(b)?);
    let out_dims = broadcast_shape(&a_dims, &b_dims, axis)?;
    let (off_a, off_b) = broadcast_offsets(a_dims.len(), b_dims.len(), axis)?;
    debug!(primitive = primitive.name(), out = name, shape = ?out_dims, "synthesizing broadcast kernel");

    Tensor::compute(name, to_sint(&out_dims), |idx| {
        let lhs = a.at(&broadcast_indices(idx, &a_dims, off_a)).context(IrSnafu)?;
        let rhs = b.at(&broadcast_indices(idx, &b_dims, off_b)).context(IrSnafu)?;
        Expr::try_binary(primitive.op(), &lhs, &rhs).context(IrSnafu)
    })
}
