use snafu::{OptionExt, ResultExt};
use strata_ir::externs::extern_symbol;
use strata_ir::{Expr, Tensor};
use strata_schedule::Target;
use tracing::debug;

use crate::error::*;

/// `out[i] = 1 / input[i]` through the target's reciprocal extern.
///
/// Only IEEE floats have an extern variant.
pub fn reciprocal(input: &Tensor, target: &Target, name: &str) -> Result<Tensor> {
    let dtype = input.dtype();
    let symbol = extern_symbol(target.extern_backend(), "reciprocal", dtype)
        .context(UnsupportedDtypeSnafu { operation: "reciprocal", dtype })?;
    debug!(symbol = symbol.as_str(), out = name, "synthesizing reciprocal kernel");

    Tensor::compute(name, input.shape().clone(), |idx| {
        let x = input.at(idx).context(IrSnafu)?;
        Ok(Expr::call_extern(symbol.as_str(), &[x], dtype))
    })
}
