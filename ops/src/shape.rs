//! Shape algebra: broadcasting, reductions and explicit broadcast maps.
//!
//! All functions work on concrete shapes. Symbolic dimensions are rejected
//! before they get here (see [`static_dims`]).

use snafu::{OptionExt, ensure};
use strata_ir::{SInt, Tensor};
use tracing::debug;

use crate::error::*;

/// Resolve a possibly negative `axis` against `rank`.
pub fn normalize_axis(axis: i64, rank: usize) -> Result<usize> {
    let real = if axis < 0 { axis + rank as i64 } else { axis };
    ensure!(real >= 0 && (real as usize) < rank, AxisOutOfRangeSnafu { axis, rank });
    Ok(real as usize)
}

/// Concrete dimensions of `tensor`.
pub fn static_dims(tensor: &Tensor) -> Result<Vec<usize>> {
    tensor
        .shape()
        .iter()
        .enumerate()
        .map(|(dim, d)| d.as_const().context(NonConstantShapeSnafu { tensor: tensor.name(), dim }))
        .collect()
}

pub(crate) fn to_sint(dims: &[usize]) -> strata_ir::Shape {
    dims.iter().copied().map(SInt::from).collect()
}

/// Position of each input's first dimension within the broadcast output.
///
/// Without `axis` both inputs are right-aligned; with it the second input
/// starts at `axis` of the first.
pub(crate) fn broadcast_offsets(a_rank: usize, b_rank: usize, axis: Option<i64>) -> Result<(usize, usize)> {
    match axis {
        None => {
            let out_rank = a_rank.max(b_rank);
            Ok((out_rank - a_rank, out_rank - b_rank))
        }
        Some(axis) => {
            let start = if axis < 0 { axis + a_rank as i64 } else { axis };
            ensure!(
                start >= 0 && start as usize + b_rank <= a_rank,
                AxisOutOfRangeSnafu { axis, rank: a_rank }
            );
            Ok((0, start as usize))
        }
    }
}

/// NumPy-style broadcast of two shapes.
///
/// A dimension of 1 stretches to the other side; otherwise both must agree.
/// Leading positions only one shape covers are copied through.
pub fn broadcast_shape(a: &[usize], b: &[usize], axis: Option<i64>) -> Result<Vec<usize>> {
    let (off_a, off_b) = broadcast_offsets(a.len(), b.len(), axis)?;
    let out_rank = (off_a + a.len()).max(off_b + b.len());

    let dim_at = |shape: &[usize], offset: usize, k: usize| -> usize {
        k.checked_sub(offset).and_then(|i| shape.get(i).copied()).unwrap_or(1)
    };

    let mut out = Vec::with_capacity(out_rank);
    for k in 0..out_rank {
        let (da, db) = (dim_at(a, off_a, k), dim_at(b, off_b, k));
        let d = match (da, db) {
            _ if da == db => da,
            (1, _) => db,
            (_, 1) => da,
            _ => return ShapeMismatchSnafu { lhs: a, rhs: b, lhs_dim: da, rhs_dim: db }.fail(),
        };
        out.push(d);
    }
    debug!(?a, ?b, ?axis, out = ?out, "broadcast shape");
    Ok(out)
}

/// Output shape of a single-axis reduction.
///
/// With `keep_dims` the axis becomes 1, otherwise it is removed; a fully
/// reduced shape is `[1]`.
pub fn reduce_shape(shape: &[usize], axis: i64, keep_dims: bool) -> Result<Vec<usize>> {
    let axis = normalize_axis(axis, shape.len())?;
    let mut out: Vec<usize> = shape.to_vec();
    if keep_dims {
        out[axis] = 1;
    } else {
        out.remove(axis);
    }
    if out.is_empty() {
        out.push(1);
    }
    Ok(out)
}

/// Validate an explicit broadcast map and return `target`.
pub fn broadcast_to_shape(input: &[usize], axes: &[usize], target: &[usize]) -> Result<Vec<usize>> {
    ensure!(input.len() == axes.len(), AxisMapMismatchSnafu { rank: input.len(), axes: axes.len() });
    ensure!(target.len() >= axes.len(), RankMismatchSnafu { target: target.len(), axes: axes.len() });
    Ok(target.to_vec())
}

/// Check that every input dimension lands on a compatible output dimension.
pub(crate) fn check_broadcast_axes(input: &[usize], axes: &[usize], target: &[usize]) -> Result<()> {
    broadcast_to_shape(input, axes, target)?;
    for (&dim, &axis) in input.iter().zip(axes) {
        let out_dim = *target.get(axis).context(AxisOutOfRangeSnafu { axis: axis as i64, rank: target.len() })?;
        ensure!(
            dim == 1 || dim == out_dim,
            ShapeMismatchSnafu { lhs: input, rhs: target, lhs_dim: dim, rhs_dim: out_dim }
        );
    }
    Ok(())
}
