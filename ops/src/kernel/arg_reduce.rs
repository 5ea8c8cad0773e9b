//! Index-of-extremum reductions over one axis.
//!
//! The lowered IR has no mutable scalars, so the fold runs through two local
//! scratch buffers of `extent + 1` slots: slot 0 holds the sentinel and
//! iteration `k` writes the running best value and index into slot `k + 1`.
//! The output element is the index left in the last slot.

use std::sync::Arc;

use snafu::{ResultExt, ensure};
use strata_dtype::DType;
use strata_ir::{Buffer, ConstValue, Expr, ForKind, Tensor};
use tracing::debug;

use crate::error::*;
use crate::shape::{normalize_axis, reduce_shape, static_dims, to_sint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ArgReduceKind {
    Min,
    Max,
}

impl ArgReduceKind {
    /// Value the running best starts from.
    fn sentinel(self, dtype: DType) -> ConstValue {
        match self {
            Self::Min => ConstValue::max_of(dtype),
            Self::Max => ConstValue::min_of(dtype),
        }
    }

    /// Strict comparison: ties keep the earliest index.
    fn improves(self, candidate: &Arc<Expr>, best: &Arc<Expr>) -> strata_ir::Result<Arc<Expr>> {
        match self {
            Self::Min => candidate.try_lt(best),
            Self::Max => candidate.try_gt(best),
        }
    }
}

/// Index of the minimum (or maximum) of `input` along `axis`, as `Int32`.
///
/// Without `keep_dims` the reduced axis is dropped from the output and
/// re-inserted when indexing `input`; a fully reduced output has shape `[1]`.
pub fn arg_reduce(input: &Tensor, kind: ArgReduceKind, axis: i64, keep_dims: bool, name: &str) -> Result<Tensor> {
    let operation = format!("arg{kind}");
    ensure!(input.rank() > 0, EmptyInputShapeSnafu { operation });
    let dims = static_dims(input)?;
    let real_axis = normalize_axis(axis, dims.len())?;
    let out_dims = reduce_shape(&dims, axis, keep_dims)?;
    let extent = dims[real_axis];
    ensure!(extent > 0, EmptyReductionSnafu { operation, axis: real_axis });
    let dtype = input.dtype();

    let values = Buffer::local(format!("{name}_{kind}_value"), dtype, extent + 1);
    let indices = Buffer::local(format!("{name}_{kind}_index"), DType::Int32, extent + 1);
    debug!(%kind, axis = real_axis, extent, keep_dims, out = name, shape = ?out_dims, "synthesizing arg reduce kernel");

    Tensor::compute(name, to_sint(&out_dims), |idx| {
        let k = Expr::var("k", DType::Index);
        let mut eval: Vec<_> = if !keep_dims && dims.len() == 1 { Vec::new() } else { idx.to_vec() };
        if keep_dims {
            eval[real_axis] = k.clone();
        } else {
            eval.insert(real_axis, k.clone());
        }

        let fold = || -> strata_ir::Result<_> {
            let zero = Expr::index(0);
            let init_value = Expr::try_store(&values, &zero, &Expr::constant(kind.sentinel(dtype), dtype))?;
            let init_index = Expr::try_store(&indices, &zero, &Expr::constant(ConstValue::Int(0), DType::Int32))?;

            let candidate = input.at(&eval)?;
            let best = Expr::try_load(&values, &k)?;
            let best_index = Expr::try_load(&indices, &k)?;
            let better = kind.improves(&candidate, &best)?;
            let next = k.try_add(&Expr::index(1))?;
            let step = Expr::block(vec![
                Expr::try_store(&values, &next, &Expr::try_select(&better, &candidate, &best)?)?,
                Expr::try_store(&indices, &next, &Expr::try_select(&better, &Expr::cast(&k, DType::Int32), &best_index)?)?,
            ]);
            let lp = Expr::for_loop(&k, &zero, &Expr::index(extent as i64), ForKind::Serial, &step)?;

            let result = Expr::try_load(&indices, &Expr::index(extent as i64))?;
            Ok(Expr::sequence(&Expr::block(vec![init_value, init_index, lp]), &Expr::cast(&result, DType::Int32)))
        };
        fold().context(IrSnafu)
    })
}
