//! Two-phase operator strategies.
//!
//! A strategy pairs a compute phase, which synthesizes output tensors from
//! input tensors, with a schedule phase, which lowers those outputs and
//! applies the target's injective schedule. Everything both phases need is
//! captured when the strategy is built, so either can run repeatedly.

use std::sync::Arc;

use snafu::{ResultExt, ensure};
use strata_dtype::DType;
use strata_ir::{LoweredModule, NameAllocator, Tensor, lower_function};
use strata_schedule::{IrSchedule, ScheduleConfig, StageMap, Target, schedule_injective};
use tracing::{debug, trace};

use crate::error::*;

/// Kernel synthesis callback: `(inputs, output name) -> outputs`.
pub type KernelFn = Arc<dyn Fn(&[Tensor], &str) -> Result<Vec<Tensor>> + Send + Sync>;

/// Result of a compute phase.
#[derive(Debug, Clone)]
pub struct ComputeOutput {
    pub outputs: Vec<Tensor>,
    /// Every tensor the phase touched, producers first.
    pub stages: StageMap,
}

/// Per-call data captured by value when a strategy is built.
#[derive(Debug, Clone)]
pub struct StrategyContext {
    pub op: String,
    pub out_types: Vec<DType>,
    pub out_shapes: Vec<Vec<usize>>,
    pub target: Target,
    pub config: ScheduleConfig,
}

impl StrategyContext {
    pub fn new(op: impl Into<String>, out_types: &[DType], out_shapes: &[Vec<usize>], target: &Target) -> Self {
        Self {
            op: op.into(),
            out_types: out_types.to_vec(),
            out_shapes: out_shapes.to_vec(),
            target: target.clone(),
            config: ScheduleConfig::global().clone(),
        }
    }

    pub fn with_config(mut self, config: ScheduleConfig) -> Self {
        self.config = config;
        self
    }
}

/// One compute/schedule pair registered under a target-qualified name.
#[derive(Clone)]
pub struct OpImpl {
    pub name: String,
    pub plevel: i32,
    min_inputs: usize,
    ctx: StrategyContext,
    kernel: KernelFn,
}

impl std::fmt::Debug for OpImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpImpl").field("name", &self.name).field("plevel", &self.plevel).finish_non_exhaustive()
    }
}

impl OpImpl {
    pub fn context(&self) -> &StrategyContext {
        &self.ctx
    }

    /// Synthesize outputs from `inputs`.
    ///
    /// Outputs are named `output_name` when given, else `<op>_out_<n>` from `names`.
    #[tracing::instrument(skip_all, fields(strategy = self.name.as_str(), inputs = inputs.len()))]
    pub fn compute(
        &self,
        inputs: &[Tensor],
        output_name: Option<&str>,
        names: &mut NameAllocator,
    ) -> Result<ComputeOutput> {
        ensure!(!inputs.is_empty(), EmptyArgumentsSnafu);
        ensure!(
            inputs.len() >= self.min_inputs,
            ArityMismatchSnafu { operation: self.ctx.op.as_str(), expected: self.min_inputs, actual: inputs.len() }
        );
        let name = match output_name {
            Some(name) => name.to_string(),
            None => names.fresh(&format!("{}_out", self.ctx.op)),
        };

        let outputs = (self.kernel)(inputs, &name)?;
        let mut stages = StageMap::create(inputs);
        for tensor in StageMap::create(&outputs).iter() {
            stages.insert_lazily(tensor);
        }
        debug!(output = name.as_str(), stages = stages.len(), "compute phase done");
        Ok(ComputeOutput { outputs, stages })
    }

    /// Lower the compute outputs and apply the injective schedule for the captured target.
    #[tracing::instrument(skip_all, fields(strategy = self.name.as_str()))]
    pub fn schedule(&self, computed: &ComputeOutput) -> Result<LoweredModule> {
        let function = computed.outputs.first().map_or(self.ctx.op.as_str(), |t| t.name());
        let func = lower_function(function, &computed.outputs).context(IrSnafu)?;

        let mut sch = IrSchedule::new(LoweredModule::new(vec![func]));
        schedule_injective(&mut sch, &self.ctx.target, &self.ctx.config).context(ScheduleSnafu)?;
        debug!(
            out_shape = ?self.ctx.out_shapes.first(),
            out_type = ?self.ctx.out_types.first(),
            steps = sch.trace().len(),
            "schedule phase done"
        );
        let module = sch.into_module();
        for func in &module.functions {
            trace!(%func, "scheduled function");
        }
        Ok(module)
    }
}

/// The implementations available for one operator on one target.
#[derive(Debug, Clone, Default)]
pub struct OpStrategy {
    impls: Vec<OpImpl>,
}

impl OpStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_impl(&mut self, ctx: StrategyContext, min_inputs: usize, plevel: i32, kernel: KernelFn) {
        let name = ctx.target.strategy_name(&ctx.op);
        self.impls.push(OpImpl { name, plevel, min_inputs, ctx, kernel });
    }

    pub fn impls(&self) -> &[OpImpl] {
        &self.impls
    }

    /// Implementation with the highest priority; the first added wins ties.
    pub fn best(&self) -> Option<&OpImpl> {
        self.impls.iter().rev().max_by_key(|i| i.plevel)
    }
}

/// Build a single-implementation strategy around `kernel`.
pub fn assemble_strategy(
    ctx: StrategyContext,
    min_inputs: usize,
    kernel: impl Fn(&[Tensor], &str) -> Result<Vec<Tensor>> + Send + Sync + 'static,
) -> OpStrategy {
    debug!(op = ctx.op.as_str(), arch = %ctx.target.arch, "assembling strategy");
    let mut strategy = OpStrategy::new();
    strategy.add_impl(ctx, min_inputs, 1, Arc::new(kernel));
    strategy
}
