//! Shape utilities with symbolic dimension support.
//!
//! Shapes can contain both concrete integers and symbolic expressions. Shape
//! algebra for operators (broadcasting, reductions) lives with the operators;
//! this module only provides the representation and row-major addressing.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::{BinaryOp, Expr, Result, SInt};

/// Shape type - sequence of symbolic integers.
///
/// Uses SmallVec with inline capacity of 4 to avoid heap allocation for
/// common tensor ranks (1D-4D).
pub type Shape = SmallVec<[SInt; 4]>;

/// Build a static shape from concrete dimensions.
///
/// # Examples
///
/// ```rust
/// # use strata_ir::shape::{from_static, to_static};
/// let shape = from_static(&[2, 3]);
/// assert_eq!(to_static(&shape).as_deref(), Some(&[2usize, 3][..]));
/// ```
pub fn from_static(dims: &[usize]) -> Shape {
    dims.iter().copied().map(SInt::from).collect()
}

/// Check if shape is fully concrete (all dimensions are constants).
pub fn is_static(shape: &[SInt]) -> bool {
    shape.iter().all(|dim| dim.as_const().is_some())
}

/// Convert shape to concrete dimensions if fully static, None otherwise.
pub fn to_static(shape: &[SInt]) -> Option<SmallVec<[usize; 4]>> {
    shape.iter().map(SInt::as_const).collect()
}

/// Number of elements, or `None` when any dimension is symbolic.
pub fn numel(shape: &[SInt]) -> Option<usize> {
    to_static(shape).map(|dims| dims.iter().product())
}

/// Row-major flat offset of `indices` into `shape`.
///
/// Builds `((i0 * d1 + i1) * d2 + i2) ...` and relies on constant folding to
/// drop unit strides. Rank-0 shapes address offset 0.
pub fn flat_index(indices: &[Arc<Expr>], shape: &[SInt]) -> Result<Arc<Expr>> {
    let mut iter = indices.iter().zip(shape.iter());
    let Some((first, _)) = iter.next() else {
        return Ok(Expr::index(0));
    };
    let mut offset = first.clone();
    for (index, dim) in iter {
        offset = Expr::try_binary(BinaryOp::Mul, &offset, &dim.to_expr())?;
        offset = Expr::try_binary(BinaryOp::Add, &offset, index)?;
    }
    Ok(offset)
}

/// Format a shape as `[d0, d1, ...]`.
pub fn format_shape(shape: &[SInt]) -> String {
    let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
    format!("[{}]", dims.join(", "))
}
