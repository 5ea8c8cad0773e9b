//! Kernel synthesizers.
//!
//! Each synthesizer turns input tensors into an output [`Tensor`] whose body
//! computes one element from its output indices. Nothing is lowered here;
//! strategies lower and schedule the result.

mod arg_reduce;
mod broadcast;
mod broadcast_to;
mod elementwise;

use std::sync::Arc;

use strata_ir::Expr;

pub use arg_reduce::{ArgReduceKind, arg_reduce};
pub use broadcast::broadcast_binary;
pub use broadcast_to::broadcast_to;
pub use elementwise::reciprocal;

/// Input indices for a tensor of `dims` whose first dimension sits at output position `offset`.
///
/// Unit dimensions read index 0.
fn broadcast_indices(indices: &[Arc<Expr>], dims: &[usize], offset: usize) -> Vec<Arc<Expr>> {
    dims.iter()
        .enumerate()
        .map(|(k, &d)| if d == 1 { Expr::index(0) } else { indices[offset + k].clone() })
        .collect()
}
