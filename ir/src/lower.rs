//! Lowering of tensor graphs into loop nests over flat buffers.
//!
//! Each output tensor becomes one loop nest that stores its body at row-major
//! offsets. Reads of compute tensors are inlined at the use site, reads of
//! placeholders become loads from input arguments, and local scratch buffers
//! touched by a body are allocated around its store, inside the innermost
//! loop, so every output element owns its scratch.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::ensure;
use tracing::{debug, trace};

use crate::error::*;
use crate::shape::flat_index;
use crate::visit::{map_children, substitute, walk};
use crate::{Buffer, Expr, ForKind, MemScope, Op, Tensor, TensorKind};

/// Direction of a function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Input,
    Output,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub buffer: Arc<Buffer>,
    pub kind: ArgKind,
}

/// A kernel: arguments and a statement body.
#[derive(Debug, Clone)]
pub struct LoweredFunc {
    pub name: String,
    pub args: Vec<Argument>,
    pub body: Arc<Expr>,
}

impl LoweredFunc {
    pub fn inputs(&self) -> impl Iterator<Item = &Arc<Buffer>> {
        self.args.iter().filter(|a| a.kind == ArgKind::Input).map(|a| &a.buffer)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Arc<Buffer>> {
        self.args.iter().filter(|a| a.kind == ArgKind::Output).map(|a| &a.buffer)
    }

    /// Local buffers allocated anywhere in the body, in visiting order.
    pub fn locals(&self) -> Vec<Arc<Buffer>> {
        let mut locals = Vec::new();
        walk(&self.body, &mut |e| {
            if let Op::Allocate { buffer, .. } = e.op() {
                locals.push(buffer.clone());
            }
        });
        locals
    }

    /// Top-level statements of the body.
    pub fn statements(&self) -> Vec<Arc<Expr>> {
        match self.body.op() {
            Op::Block(stmts) => stmts.clone(),
            _ => vec![self.body.clone()],
        }
    }
}

/// A collection of lowered functions produced for one operator.
#[derive(Debug, Clone, Default)]
pub struct LoweredModule {
    pub functions: Vec<LoweredFunc>,
}

impl LoweredModule {
    pub fn new(functions: Vec<LoweredFunc>) -> Self {
        Self { functions }
    }

    pub fn get(&self, name: &str) -> Option<&LoweredFunc> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut LoweredFunc> {
        self.functions.iter_mut().find(|f| f.name == name)
    }
}

#[derive(Default)]
struct Lowerer {
    inputs: Vec<(u64, Arc<Buffer>)>,
    /// Local buffers touched by the body being lowered.
    locals: Vec<Arc<Buffer>>,
}

impl Lowerer {
    fn input_buffer(&mut self, tensor: &Tensor) -> Arc<Buffer> {
        if let Some((_, buffer)) = self.inputs.iter().find(|(id, _)| *id == tensor.id()) {
            return buffer.clone();
        }
        let buffer = Buffer::new(tensor.name(), tensor.dtype(), tensor.shape().clone(), MemScope::Global);
        self.inputs.push((tensor.id(), buffer.clone()));
        buffer
    }

    fn note_buffer(&mut self, buffer: &Arc<Buffer>) {
        if buffer.scope() == MemScope::Local && !self.locals.iter().any(|t| t.id() == buffer.id()) {
            self.locals.push(buffer.clone());
        }
    }

    fn lower(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
        match expr.op() {
            Op::TensorLoad { tensor, indices } => {
                let indices = indices.iter().map(|i| self.lower(i)).collect::<Result<Vec<_>>>()?;
                match tensor.kind() {
                    TensorKind::Placeholder => {
                        let buffer = self.input_buffer(tensor);
                        let offset = flat_index(&indices, tensor.shape())?;
                        Expr::try_load(&buffer, &offset)
                    }
                    TensorKind::Compute { axes, body } => {
                        trace!(tensor = tensor.name(), "inlining compute tensor");
                        let map: HashMap<u64, Arc<Expr>> = axes.iter().map(|a| a.id).zip(indices).collect();
                        let inlined = substitute(body, &map)?;
                        self.lower(&inlined)
                    }
                }
            }
            Op::Load { buffer, .. } | Op::Store { buffer, .. } => {
                self.note_buffer(buffer);
                map_children(expr, |child| self.lower(child))
            }
            _ => map_children(expr, |child| self.lower(child)),
        }
    }
}

/// Lower `outputs` into one function named `name`.
///
/// Inputs are ordered by first use, outputs follow in the given order.
#[tracing::instrument(skip_all, fields(function = name, outputs = outputs.len()))]
pub fn lower_function(name: &str, outputs: &[Tensor]) -> Result<LoweredFunc> {
    ensure!(!outputs.is_empty(), NoOutputsSnafu { function: name });

    let mut lowerer = Lowerer::default();
    let mut out_args = Vec::with_capacity(outputs.len());
    let mut nests = Vec::with_capacity(outputs.len());

    for tensor in outputs {
        let TensorKind::Compute { axes, body } = tensor.kind() else {
            return PlaceholderOutputSnafu { tensor: tensor.name() }.fail();
        };
        let buffer = Buffer::new(tensor.name(), tensor.dtype(), tensor.shape().clone(), MemScope::Global);

        let value = lowerer.lower(body)?;
        let offset = flat_index(axes, tensor.shape())?;
        let mut nest = Expr::try_store(&buffer, &offset, &value)?;
        for local in std::mem::take(&mut lowerer.locals).iter().rev() {
            nest = Expr::allocate(local, &nest)?;
        }
        for (axis, dim) in axes.iter().zip(tensor.shape().iter()).rev() {
            nest = Expr::for_loop(axis, &Expr::index(0), &dim.to_expr(), ForKind::Serial, &nest)?;
        }

        out_args.push(Argument { buffer, kind: ArgKind::Output });
        nests.push(nest);
    }

    let mut args: Vec<Argument> =
        lowerer.inputs.into_iter().map(|(_, buffer)| Argument { buffer, kind: ArgKind::Input }).collect();
    args.extend(out_args);

    let func = LoweredFunc { name: name.to_string(), args, body: Expr::block(nests) };
    debug!(inputs = func.inputs().count(), locals = func.locals().len(), "lowered function");
    Ok(func)
}
