//! Reference interpreter for lowered functions.
//!
//! Executes a [`LoweredFunc`] over host buffers. Every loop kind runs
//! serially, so a schedule can be checked by comparing interpreted results
//! before and after it is applied.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::{OptionExt, ensure};
use strata_dtype::DType;
use strata_dtype::ext::HasDType;
use tracing::debug;

use crate::error::*;
use crate::eval::{eval_binary_op, eval_unary_op};
use crate::externs::ExternTable;
use crate::lower::{ArgKind, LoweredFunc};
use crate::{Buffer, ConstValue, Expr, Op};

/// Host-side contents of one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferData {
    pub dtype: DType,
    pub values: Vec<ConstValue>,
}

impl BufferData {
    /// Values are normalized to `dtype`.
    pub fn new(dtype: DType, values: impl IntoIterator<Item = ConstValue>) -> Self {
        let values = values.into_iter().map(|v| v.cast(dtype).unwrap_or(v)).collect();
        Self { dtype, values }
    }

    pub fn from_slice<T: HasDType + Copy + Into<ConstValue>>(data: &[T]) -> Self {
        Self::new(T::DTYPE, data.iter().map(|&v| v.into()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_i64(&self) -> Option<Vec<i64>> {
        self.values.iter().map(ConstValue::as_i64).collect()
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.values.iter().map(ConstValue::as_f64).collect()
    }

    pub fn to_bool(&self) -> Vec<bool> {
        self.values.iter().map(ConstValue::is_truthy).collect()
    }
}

/// Serial executor for lowered functions.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    externs: ExternTable,
}

struct Frame<'a> {
    externs: &'a ExternTable,
    vars: HashMap<u64, ConstValue>,
    buffers: HashMap<u64, (Arc<Buffer>, Vec<ConstValue>)>,
}

impl Interpreter {
    pub fn new(externs: ExternTable) -> Self {
        Self { externs }
    }

    /// Run `func` with inputs keyed by argument name; returns outputs by name.
    pub fn run(&self, func: &LoweredFunc, inputs: &HashMap<String, BufferData>) -> Result<HashMap<String, BufferData>> {
        let mut frame = Frame { externs: &self.externs, vars: HashMap::new(), buffers: HashMap::new() };

        for arg in &func.args {
            let buffer = &arg.buffer;
            let len = buffer.len().context(SymbolicShapeUnsupportedSnafu { operation: "interpretation" })?;
            let values = match arg.kind {
                ArgKind::Input => {
                    let data = inputs.get(buffer.name()).context(MissingInputSnafu { name: buffer.name() })?;
                    ensure!(
                        data.len() == len && data.dtype == buffer.dtype(),
                        InputSizeMismatchSnafu { name: buffer.name(), dtype: buffer.dtype(), expected: len, actual: data.len() }
                    );
                    data.values.clone()
                }
                ArgKind::Output => vec![ConstValue::zero(buffer.dtype()); len],
            };
            frame.buffers.insert(buffer.id(), (buffer.clone(), values));
        }

        frame.exec(&func.body)?;
        debug!(function = func.name.as_str(), "interpreted function");

        Ok(func
            .outputs()
            .filter_map(|buffer| {
                frame.buffers.remove(&buffer.id()).map(|(buffer, values)| {
                    (buffer.name().to_string(), BufferData { dtype: buffer.dtype(), values })
                })
            })
            .collect())
    }
}

impl Frame<'_> {
    fn slot(&mut self, buffer: &Arc<Buffer>, index: &Arc<Expr>) -> Result<(usize, &mut Vec<ConstValue>)> {
        let index = self.eval_index(index)?;
        let (_, data) = self.buffers.get_mut(&buffer.id()).context(MissingInputSnafu { name: buffer.name() })?;
        let len = data.len();
        let slot = usize::try_from(index).ok().filter(|i| *i < len);
        let slot = slot.context(IndexOutOfBoundsSnafu { buffer: buffer.name(), index, len })?;
        Ok((slot, data))
    }

    fn eval_index(&mut self, expr: &Arc<Expr>) -> Result<i64> {
        let value = self.eval(expr)?;
        value.as_i64().context(EvalFailedSnafu { what: format!("non-integer index {value}") })
    }

    fn exec(&mut self, stmt: &Arc<Expr>) -> Result<()> {
        match stmt.op() {
            Op::Store { buffer, index, value } => {
                let value = self.eval(value)?;
                let value = value.cast(buffer.dtype()).unwrap_or(value);
                let (slot, data) = self.slot(buffer, index)?;
                data[slot] = value;
            }
            Op::For { var, min, extent, body, .. } => {
                let min = self.eval_index(min)?;
                let extent = self.eval_index(extent)?;
                for i in min..min + extent {
                    self.vars.insert(var.id, ConstValue::Int(i));
                    self.exec(body)?;
                }
                self.vars.remove(&var.id);
            }
            Op::IfThen { cond, body } => {
                if self.eval(cond)?.is_truthy() {
                    self.exec(body)?;
                }
            }
            Op::Allocate { buffer, body } => {
                let len = buffer.len().context(SymbolicShapeUnsupportedSnafu { operation: "interpretation" })?;
                self.buffers.insert(buffer.id(), (buffer.clone(), vec![ConstValue::zero(buffer.dtype()); len]));
                let result = self.exec(body);
                self.buffers.remove(&buffer.id());
                result?;
            }
            Op::Block(stmts) => {
                for stmt in stmts {
                    self.exec(stmt)?;
                }
            }
            Op::Sequence { effect, value } => {
                self.exec(effect)?;
                self.eval(value)?;
            }
            _ => {
                self.eval(stmt)?;
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Arc<Expr>) -> Result<ConstValue> {
        let dtype = expr.dtype();
        match expr.op() {
            Op::Const(v) => Ok(*v),
            Op::Var { name } => self.vars.get(&expr.id).copied().context(UnboundVariableSnafu { name: name.as_str() }),
            Op::Unary(op, x) => {
                let x = self.eval(x)?;
                eval_unary_op(*op, x, dtype).context(EvalFailedSnafu { what: format!("{op:?}({x})") })
            }
            Op::Binary(op, a, b) => {
                let (a, b) = (self.eval(a)?, self.eval(b)?);
                match eval_binary_op(*op, a, b, dtype) {
                    Some(v) => Ok(v),
                    None if !b.is_truthy() => DivisionByZeroSnafu.fail(),
                    None => EvalFailedSnafu { what: format!("{op:?}({a}, {b})") }.fail(),
                }
            }
            Op::Select { cond, on_true, on_false } => {
                // Only the taken branch is evaluated; guarded loads may be out of bounds otherwise.
                let chosen = if self.eval(cond)?.is_truthy() { on_true } else { on_false };
                self.eval(chosen)
            }
            Op::Cast(x) => {
                let x = self.eval(x)?;
                x.cast(dtype).context(EvalFailedSnafu { what: format!("cast of {x} to {dtype}") })
            }
            Op::Load { buffer, index } => {
                let (slot, data) = self.slot(buffer, index)?;
                Ok(data[slot])
            }
            Op::Sequence { effect, value } => {
                self.exec(effect)?;
                self.eval(value)
            }
            Op::CallExtern { name, args } => {
                let decl = *self.externs.get(name).context(UnknownExternSnafu { name: name.as_str() })?;
                ensure!(
                    decl.arity == args.len(),
                    ExternArityMismatchSnafu { name: name.as_str(), expected: decl.arity, actual: args.len() }
                );
                let values = args.iter().map(|a| self.eval(a)).collect::<Result<Vec<_>>>()?;
                let result = (decl.func)(&values).context(EvalFailedSnafu { what: format!("extern `{name}`") })?;
                Ok(result.cast(dtype).unwrap_or(result))
            }
            Op::TensorLoad { tensor, .. } => {
                EvalFailedSnafu { what: format!("unlowered read of tensor `{}`", tensor.name()) }.fail()
            }
            Op::Store { .. } | Op::For { .. } | Op::IfThen { .. } | Op::Allocate { .. } | Op::Block(_) => {
                EvalFailedSnafu { what: "statement in value position".to_string() }.fail()
            }
        }
    }
}
