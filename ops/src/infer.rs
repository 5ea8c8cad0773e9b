//! Element type inference.

use snafu::ensure;
use strata_dtype::DType;

use crate::error::*;

/// How an operator derives its output type from its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DTypeRule {
    SameAsFirst,
    /// Comparisons and logical operators.
    Bool,
    /// Index-producing reductions (`argmin`, `argmax`).
    Int32,
}

pub fn infer_dtype(types: &[DType], rule: DTypeRule) -> Result<DType> {
    let Some(&first) = types.first() else {
        return EmptyInputTypeSnafu.fail();
    };
    Ok(match rule {
        DTypeRule::SameAsFirst => first,
        DTypeRule::Bool => DType::Bool,
        DTypeRule::Int32 => DType::Int32,
    })
}

/// Types of an operator taking `(grad_out, x, y)` and producing `(grad_x, grad_y)`.
pub fn infer_grad_dtypes(types: &[DType]) -> Result<Vec<DType>> {
    ensure!(
        types.len() == 3,
        ArityMismatchSnafu { operation: "gradient dtype inference", expected: 3usize, actual: types.len() }
    );
    Ok(vec![types[1], types[2]])
}
