//! Operator descriptors and the process-wide registry.
//!
//! The registry is filled once, on first use, and only read afterwards.

use std::collections::BTreeMap;

use bon::bon;
use once_cell::sync::Lazy;
use snafu::{OptionExt, ResultExt, ensure};
use strata_dtype::DType;
use strata_schedule::{ScheduleConfig, Target};

use crate::attr::AttrMap;
use crate::builtin;
use crate::error::*;
use crate::kernel::ArgReduceKind;
use crate::layout::InferredLayouts;
use crate::primitive::BinaryPrimitive;
use crate::strategy::{OpStrategy, StrategyContext};

/// Coarse data-dependency class used to pick compatible schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OpPatternKind {
    ElementWise,
    Broadcast,
    Injective,
    Reduction,
    /// Never fused or scheduled (gradient stubs).
    Opaque,
}

/// Operator family; selects the inference rules and the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Binary(BinaryPrimitive),
    BroadcastTo,
    ArgReduce(ArgReduceKind),
    Reciprocal,
    AddGrad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpDescriptor {
    pub name: String,
    pub kind: OpKind,
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub pattern: OpPatternKind,
    pub support_level: u32,
    pub description: String,
}

#[bon]
impl OpDescriptor {
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        kind: OpKind,
        #[builder(default = 1)] num_inputs: usize,
        #[builder(default = 1)] num_outputs: usize,
        pattern: OpPatternKind,
        #[builder(default = 4)] support_level: u32,
        #[builder(into, default)] description: String,
    ) -> Self {
        Self { name, kind, num_inputs, num_outputs, pattern, support_level, description }
    }
}

impl OpDescriptor {
    fn scoped<T>(&self, result: Result<T>) -> Result<T> {
        result.context(InOperatorSnafu { op: self.name.as_str() })
    }

    pub fn infer_shape(&self, shapes: &[Vec<usize>], attrs: &AttrMap) -> Result<Vec<Vec<usize>>> {
        self.scoped(match self.kind {
            OpKind::Binary(_) => builtin::broadcast::infer_shape(shapes, attrs),
            OpKind::BroadcastTo => builtin::broadcast_to::infer_shape(shapes, attrs),
            OpKind::ArgReduce(_) => builtin::arg_reduce::infer_shape(shapes, attrs),
            OpKind::Reciprocal => builtin::reciprocal::infer_shape(shapes),
            OpKind::AddGrad => builtin::grad::infer_shape(shapes),
        })
    }

    pub fn infer_dtype(&self, types: &[DType], _attrs: &AttrMap) -> Result<Vec<DType>> {
        self.scoped(match self.kind {
            OpKind::Binary(primitive) => builtin::broadcast::infer_dtype(types, primitive),
            OpKind::BroadcastTo | OpKind::Reciprocal => builtin::same_dtype(types),
            OpKind::ArgReduce(_) => builtin::arg_reduce::infer_dtype(types),
            OpKind::AddGrad => builtin::grad::infer_dtype(types),
        })
    }

    /// Output layouts and the layouts inputs should be converted to.
    ///
    /// Families without a layout rule pass the first input layout through.
    pub fn infer_layout(
        &self,
        shapes: &[Vec<usize>],
        layouts: &[String],
        attrs: &AttrMap,
        _target: &Target,
    ) -> Result<InferredLayouts> {
        self.scoped(match self.kind {
            OpKind::Binary(_) => crate::layout::infer_broadcast_layout(shapes, layouts),
            OpKind::BroadcastTo => builtin::broadcast_to::infer_layout(layouts, attrs),
            OpKind::ArgReduce(_) => crate::layout::infer_arg_reduce_layout(shapes, layouts),
            OpKind::Reciprocal | OpKind::AddGrad => {
                let first = layouts.first().cloned().unwrap_or_default();
                Ok(InferredLayouts::new(vec![first; self.num_outputs], layouts.to_vec()))
            }
        })
    }

    /// Strategy for `target` using the process-wide schedule configuration.
    pub fn strategy(
        &self,
        attrs: &AttrMap,
        out_types: &[DType],
        out_shapes: &[Vec<usize>],
        target: &Target,
    ) -> Result<OpStrategy> {
        self.strategy_with_config(attrs, out_types, out_shapes, target, ScheduleConfig::global())
    }

    pub fn strategy_with_config(
        &self,
        attrs: &AttrMap,
        out_types: &[DType],
        out_shapes: &[Vec<usize>],
        target: &Target,
        config: &ScheduleConfig,
    ) -> Result<OpStrategy> {
        let ctx = StrategyContext::new(&self.name, out_types, out_shapes, target).with_config(config.clone());
        self.scoped(match self.kind {
            OpKind::Binary(primitive) => builtin::broadcast::strategy(primitive, attrs, ctx),
            OpKind::BroadcastTo => builtin::broadcast_to::strategy(attrs, ctx),
            OpKind::ArgReduce(kind) => builtin::arg_reduce::strategy(kind, attrs, ctx),
            OpKind::Reciprocal => builtin::reciprocal::strategy(ctx),
            OpKind::AddGrad => builtin::grad::strategy(&self.name),
        })
    }
}

/// Name to descriptor map.
#[derive(Debug, Clone, Default)]
pub struct OpRegistry {
    ops: BTreeMap<String, OpDescriptor>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in operator.
    pub fn with_builtins() -> Self {
        let ops = builtin::descriptors().into_iter().map(|d| (d.name.clone(), d)).collect();
        Self { ops }
    }

    pub fn register(&mut self, descriptor: OpDescriptor) -> Result<()> {
        ensure!(!self.ops.contains_key(&descriptor.name), DuplicateOperatorSnafu { name: descriptor.name.as_str() });
        self.ops.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&OpDescriptor> {
        self.ops.get(name).context(UnknownOperatorSnafu { name })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

static REGISTRY: Lazy<OpRegistry> = Lazy::new(OpRegistry::with_builtins);

/// The process-wide registry of built-in operators.
pub fn registry() -> &'static OpRegistry {
    &REGISTRY
}
