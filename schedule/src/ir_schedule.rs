//! Loop-nest schedule primitives over lowered functions.
//!
//! Loops are addressed by the node id of their loop variable. Every primitive
//! rewrites the function body in place and appends a [`ScheduleStep`] to the
//! trace; none of them change the values the function computes.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::{OptionExt, ResultExt, ensure};
use strata_dtype::DType;
use strata_ir::visit::{map_children, substitute, walk};
use strata_ir::{Expr, ForKind, LoweredFunc, LoweredModule, Op};
use tracing::trace;

use crate::error::*;

/// A `For` node as seen by the scheduler.
#[derive(Debug, Clone)]
pub struct LoopInfo {
    pub var: Arc<Expr>,
    pub min: Arc<Expr>,
    pub extent: Arc<Expr>,
    pub kind: ForKind,
    pub body: Arc<Expr>,
}

impl LoopInfo {
    fn from_node(node: &Arc<Expr>) -> Option<Self> {
        match node.op() {
            Op::For { var, min, extent, kind, body } => Some(Self {
                var: var.clone(),
                min: min.clone(),
                extent: extent.clone(),
                kind: *kind,
                body: body.clone(),
            }),
            _ => None,
        }
    }

    pub fn id(&self) -> u64 {
        self.var.id
    }

    pub fn name(&self) -> &str {
        self.var.var_name().unwrap_or("?")
    }

    pub fn static_extent(&self) -> Option<usize> {
        self.extent.as_const().and_then(|c| c.as_i64()).and_then(|v| usize::try_from(v).ok())
    }

    fn starts_at_zero(&self) -> bool {
        self.min.as_const().and_then(|c| c.as_i64()) == Some(0)
    }
}

/// One applied primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleStep {
    Fuse { loops: Vec<String>, fused: String },
    Split { target: String, factor: usize, guarded: bool },
    Annotate { target: String, kind: ForKind },
}

impl std::fmt::Display for ScheduleStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fuse { loops, fused } => write!(f, "fuse({}) -> {fused}", loops.join(", ")),
            Self::Split { target, factor, guarded: false } => write!(f, "split({target}, {factor})"),
            Self::Split { target, factor, guarded: true } => write!(f, "split({target}, {factor}) guarded"),
            Self::Annotate { target, kind } => write!(f, "annotate({target}, {kind:?})"),
        }
    }
}

/// Mutable schedule over a [`LoweredModule`].
#[derive(Debug, Clone)]
pub struct IrSchedule {
    module: LoweredModule,
    trace: Vec<ScheduleStep>,
}

impl IrSchedule {
    pub fn new(module: LoweredModule) -> Self {
        Self { module, trace: Vec::new() }
    }

    pub fn module(&self) -> &LoweredModule {
        &self.module
    }

    pub fn into_module(self) -> LoweredModule {
        self.module
    }

    pub fn trace(&self) -> &[ScheduleStep] {
        &self.trace
    }

    pub fn function_names(&self) -> Vec<String> {
        self.module.functions.iter().map(|f| f.name.clone()).collect()
    }

    fn function(&self, name: &str) -> Result<&LoweredFunc> {
        self.module.get(name).context(UnknownFunctionSnafu { name })
    }

    fn find_loop(&self, function: &str, loop_id: u64) -> Result<LoopInfo> {
        let func = self.function(function)?;
        let mut found = None;
        walk(&func.body, &mut |e| {
            if found.is_none()
                && let Op::For { var, .. } = e.op()
                && var.id == loop_id
            {
                found = LoopInfo::from_node(e);
            }
        });
        found.context(UnknownLoopSnafu { function, loop_id })
    }

    /// Replace the `For` node of `loop_id` with `replacement`.
    fn replace_loop(&mut self, function: &str, loop_id: u64, replacement: Arc<Expr>) -> Result<()> {
        fn go(expr: &Arc<Expr>, loop_id: u64, replacement: &Arc<Expr>) -> strata_ir::Result<Arc<Expr>> {
            match expr.op() {
                Op::For { var, .. } if var.id == loop_id => Ok(replacement.clone()),
                _ => map_children(expr, |child| go(child, loop_id, replacement)),
            }
        }

        let func = self.module.get_mut(function).context(UnknownFunctionSnafu { name: function })?;
        func.body = go(&func.body, loop_id, &replacement).context(IrSnafu)?;
        Ok(())
    }

    /// Perfectly nested loop chains, one per top-level statement of `function`.
    ///
    /// A chain stops at the first body that is not itself a loop.
    pub fn loop_nests(&self, function: &str) -> Result<Vec<Vec<LoopInfo>>> {
        let func = self.function(function)?;
        Ok(func
            .statements()
            .iter()
            .map(|stmt| {
                let mut chain = Vec::new();
                let mut cursor = stmt.clone();
                while let Some(info) = LoopInfo::from_node(&cursor) {
                    cursor = info.body.clone();
                    chain.push(info);
                }
                chain
            })
            .collect())
    }

    /// Dtype of the first global buffer stored under `loop_id`.
    pub fn stored_dtype(&self, function: &str, loop_id: u64) -> Result<Option<DType>> {
        let info = self.find_loop(function, loop_id)?;
        let mut dtype = None;
        walk(&info.body, &mut |e| {
            if dtype.is_none()
                && let Op::Store { buffer, .. } = e.op()
                && buffer.scope() == strata_ir::MemScope::Global
            {
                dtype = Some(buffer.dtype());
            }
        });
        Ok(dtype)
    }

    /// Fuse a perfectly nested chain (outermost first) into a single loop.
    ///
    /// Original variables are recovered as `(fused / stride_k) % extent_k`.
    pub fn fuse(&mut self, function: &str, loops: &[u64]) -> Result<LoopInfo> {
        let Some((&first, _)) = loops.split_first() else {
            return NotPerfectlyNestedSnafu { loops: Vec::<u64>::new() }.fail();
        };
        let mut chain = vec![self.find_loop(function, first)?];
        for &id in &loops[1..] {
            let parent = &chain[chain.len() - 1];
            let child = LoopInfo::from_node(&parent.body).filter(|c| c.id() == id);
            chain.push(child.context(NotPerfectlyNestedSnafu { loops: loops.to_vec() })?);
        }
        if chain.len() == 1 {
            return Ok(chain.remove(0));
        }
        for info in &chain {
            ensure!(info.starts_at_zero(), NonZeroLoopStartSnafu { var: info.name(), primitive: "fused" });
        }

        let names: Vec<String> = chain.iter().map(|l| l.name().to_string()).collect();
        let fused_name = format!("{}_fused", names.join("_"));
        let fused_var = Expr::var(fused_name.as_str(), DType::Index);

        let mut total = Expr::index(1);
        for info in &chain {
            total = total.try_mul(&info.extent).context(IrSnafu)?;
        }

        let mut map = HashMap::new();
        let mut stride = Expr::index(1);
        for (k, info) in chain.iter().enumerate().rev() {
            let mut recovered = fused_var.try_div(&stride).context(IrSnafu)?;
            if k > 0 {
                recovered = recovered.try_mod(&info.extent).context(IrSnafu)?;
            }
            map.insert(info.id(), recovered);
            stride = stride.try_mul(&info.extent).context(IrSnafu)?;
        }

        let innermost = &chain[chain.len() - 1].body;
        let body = substitute(innermost, &map).context(IrSnafu)?;
        let fused =
            Expr::for_loop(&fused_var, &Expr::index(0), &total, ForKind::Serial, &body).context(IrSnafu)?;

        trace!(loops = ?names, fused = fused_name.as_str(), "fuse");
        self.replace_loop(function, first, fused.clone())?;
        self.trace.push(ScheduleStep::Fuse { loops: names, fused: fused_name });
        LoopInfo::from_node(&fused).context(UnknownLoopSnafu { function, loop_id: fused_var.id })
    }

    /// Split `loop_id` into `outer * factor + inner`.
    ///
    /// When `factor` does not divide the extent the body is guarded by
    /// `var < extent`.
    pub fn split(&mut self, function: &str, loop_id: u64, factor: usize) -> Result<(LoopInfo, LoopInfo)> {
        ensure!(factor > 0, InvalidFactorSnafu { factor, primitive: "split" });
        let info = self.find_loop(function, loop_id)?;
        ensure!(info.starts_at_zero(), NonZeroLoopStartSnafu { var: info.name(), primitive: "split" });
        let extent = info.static_extent().context(SymbolicExtentSnafu { var: info.name(), primitive: "split" })?;

        let outer_var = Expr::var(format!("{}_outer", info.name()), DType::Index);
        let inner_var = Expr::var(format!("{}_inner", info.name()), DType::Index);
        let factor_expr = Expr::index(factor as i64);
        let recovered = outer_var.try_mul(&factor_expr).and_then(|o| o.try_add(&inner_var)).context(IrSnafu)?;

        let guarded = extent % factor != 0;
        let mut body = substitute(&info.body, &HashMap::from([(info.id(), recovered.clone())])).context(IrSnafu)?;
        if guarded {
            let cond = recovered.try_lt(&info.extent).context(IrSnafu)?;
            body = Expr::if_then(&cond, &body).context(IrSnafu)?;
        }

        let outer_extent = Expr::index(extent.div_ceil(factor) as i64);
        let zero = Expr::index(0);
        let inner = Expr::for_loop(&inner_var, &zero, &factor_expr, ForKind::Serial, &body).context(IrSnafu)?;
        let outer = Expr::for_loop(&outer_var, &zero, &outer_extent, info.kind, &inner).context(IrSnafu)?;

        trace!(loop_var = info.name(), factor, guarded, "split");
        self.replace_loop(function, loop_id, outer.clone())?;
        self.trace.push(ScheduleStep::Split { target: info.name().to_string(), factor, guarded });

        let outer_info = LoopInfo::from_node(&outer).context(UnknownLoopSnafu { function, loop_id: outer_var.id })?;
        let inner_info = LoopInfo::from_node(&inner).context(UnknownLoopSnafu { function, loop_id: inner_var.id })?;
        Ok((outer_info, inner_info))
    }

    fn annotate(&mut self, function: &str, loop_id: u64, kind: ForKind) -> Result<()> {
        let info = self.find_loop(function, loop_id)?;
        let node = Expr::for_loop(&info.var, &info.min, &info.extent, kind, &info.body).context(IrSnafu)?;
        self.replace_loop(function, loop_id, node)?;
        self.trace.push(ScheduleStep::Annotate { target: info.name().to_string(), kind });
        Ok(())
    }

    /// Map the iterations of a static-extent loop onto SIMD lanes.
    pub fn vectorize(&mut self, function: &str, loop_id: u64) -> Result<()> {
        let info = self.find_loop(function, loop_id)?;
        let lanes = info.static_extent().context(SymbolicExtentSnafu { var: info.name(), primitive: "vectorized" })?;
        self.annotate(function, loop_id, ForKind::Vectorized(lanes))
    }

    pub fn parallel(&mut self, function: &str, loop_id: u64) -> Result<()> {
        self.annotate(function, loop_id, ForKind::Parallel)
    }

    pub fn unroll(&mut self, function: &str, loop_id: u64) -> Result<()> {
        let info = self.find_loop(function, loop_id)?;
        ensure!(info.static_extent().is_some(), SymbolicExtentSnafu { var: info.name(), primitive: "unrolled" });
        self.annotate(function, loop_id, ForKind::Unrolled)
    }

    /// Bind a loop to a GPU block or thread axis.
    pub fn bind(&mut self, function: &str, loop_id: u64, kind: ForKind) -> Result<()> {
        ensure!(kind.is_gpu_bound(), NotGpuBindingSnafu { kind: format!("{kind:?}") });
        self.annotate(function, loop_id, kind)
    }
}
