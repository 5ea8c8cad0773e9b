use snafu::ResultExt;
use strata_ir::{Expr, Tensor};

use crate::error::*;
use crate::shape::{check_broadcast_axes, static_dims, to_sint};

/// `out[idx] = input[j]` with `j[i] = idx[axes[i]]`, or 0 where the input dimension is 1.
pub fn broadcast_to(input: &Tensor, out_shape: &[usize], axes: &[usize], name: &str) -> Result<Tensor> {
    let dims = static_dims(input)?;
    check_broadcast_axes(&dims, axes, out_shape)?;

    Tensor::compute(name, to_sint(out_shape), |idx| {
        let indices: Vec<_> =
            dims.iter().zip(axes).map(|(&d, &axis)| if d == 1 { Expr::index(0) } else { idx[axis].clone() }).collect();
        input.at(&indices).context(IrSnafu)
    })
}
