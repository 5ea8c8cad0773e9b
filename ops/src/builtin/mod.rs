//! Built-in operator families.

pub(crate) mod arg_reduce;
pub(crate) mod broadcast;
pub(crate) mod broadcast_to;
pub(crate) mod grad;
pub(crate) mod reciprocal;

use snafu::ensure;
use strata_dtype::DType;

use crate::error::*;
use crate::infer::{DTypeRule, infer_dtype};
use crate::registry::OpDescriptor;

/// Every built-in descriptor.
pub(crate) fn descriptors() -> Vec<OpDescriptor> {
    let mut ops = broadcast::descriptors();
    ops.push(broadcast_to::descriptor());
    ops.extend(arg_reduce::descriptors());
    ops.push(reciprocal::descriptor());
    ops.push(grad::descriptor());
    ops
}

pub(crate) fn same_dtype(types: &[DType]) -> Result<Vec<DType>> {
    Ok(vec![infer_dtype(types, DTypeRule::SameAsFirst)?])
}

pub(crate) fn expect_shapes(operation: &str, expected: usize, shapes: &[Vec<usize>]) -> Result<()> {
    ensure!(shapes.len() == expected, ArityMismatchSnafu { operation, expected, actual: shapes.len() });
    Ok(())
}
