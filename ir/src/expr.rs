//! Expression nodes and their checked constructors.
//!
//! Every node is an immutable [`Arc<Expr>`]. Values and statements share one
//! node type: statements (stores, loops, blocks) carry [`DType::Void`].
//! Constructors validate dtypes eagerly and fold constant operands, so index
//! arithmetic built by lowering and scheduling stays compact.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::{SmallVec, smallvec};
use snafu::ensure;
use strata_dtype::DType;

use crate::error::*;
use crate::eval::{eval_binary_op, eval_unary_op};
use crate::{Buffer, ConstValue, ForKind, MemScope, Tensor};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identity for expressions, buffers and tensors.
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Operation carried by an [`Expr`].
#[derive(Debug, Clone)]
pub enum Op {
    Const(ConstValue),
    /// Loop or symbolic variable. Identity is the node id, not the name.
    Var { name: String },
    Unary(crate::UnaryOp, Arc<Expr>),
    Binary(crate::BinaryOp, Arc<Expr>, Arc<Expr>),
    Select { cond: Arc<Expr>, on_true: Arc<Expr>, on_false: Arc<Expr> },
    Cast(Arc<Expr>),
    /// Multi-dimensional read of a tensor; removed by lowering.
    TensorLoad { tensor: Tensor, indices: SmallVec<[Arc<Expr>; 4]> },
    Load { buffer: Arc<Buffer>, index: Arc<Expr> },
    Store { buffer: Arc<Buffer>, index: Arc<Expr>, value: Arc<Expr> },
    For { var: Arc<Expr>, min: Arc<Expr>, extent: Arc<Expr>, kind: ForKind, body: Arc<Expr> },
    IfThen { cond: Arc<Expr>, body: Arc<Expr> },
    /// Local `buffer` that exists only while `body` runs; each execution gets fresh storage.
    Allocate { buffer: Arc<Buffer>, body: Arc<Expr> },
    Block(Vec<Arc<Expr>>),
    /// Run `effect`, then yield `value`.
    Sequence { effect: Arc<Expr>, value: Arc<Expr> },
    CallExtern { name: String, args: SmallVec<[Arc<Expr>; 2]> },
}

#[derive(Debug)]
pub struct Expr {
    pub id: u64,
    op: Op,
    dtype: DType,
}

/// Macro for binary operations that go through [`Expr::try_binary`].
macro_rules! binary_ops {
    ($($method:ident => $op:ident),+ $(,)?) => {
        $(
            #[track_caller]
            pub fn $method(self: &Arc<Self>, rhs: &Arc<Self>) -> Result<Arc<Self>> {
                Self::try_binary(crate::BinaryOp::$op, self, rhs)
            }
        )+
    };
}

impl Expr {
    /// Create a node without validation or folding.
    pub fn new(op: Op, dtype: DType) -> Arc<Self> {
        Arc::new(Self { id: next_id(), op, dtype })
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn as_const(&self) -> Option<ConstValue> {
        match self.op {
            Op::Const(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self.op, Op::Var { .. })
    }

    pub fn var_name(&self) -> Option<&str> {
        match &self.op {
            Op::Var { name } => Some(name),
            _ => None,
        }
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    /// Constant of `dtype`; the value is cast to `dtype` first.
    pub fn constant(value: ConstValue, dtype: DType) -> Arc<Self> {
        let value = value.cast(dtype).unwrap_or(value);
        Self::new(Op::Const(value), dtype)
    }

    /// `Index` constant.
    pub fn index(value: i64) -> Arc<Self> {
        Self::new(Op::Const(ConstValue::Int(value)), DType::Index)
    }

    pub fn var(name: impl Into<String>, dtype: DType) -> Arc<Self> {
        Self::new(Op::Var { name: name.into() }, dtype)
    }

    // =========================================================================
    // Value operations
    // =========================================================================

    /// Convert to `dtype`. Identity casts return the operand.
    pub fn cast(operand: &Arc<Self>, dtype: DType) -> Arc<Self> {
        if operand.dtype == dtype {
            return operand.clone();
        }
        if let Some(folded) = operand.as_const().and_then(|v| v.cast(dtype)) {
            return Self::new(Op::Const(folded), dtype);
        }
        Self::new(Op::Cast(operand.clone()), dtype)
    }

    pub fn try_unary(op: crate::UnaryOp, operand: &Arc<Self>) -> Result<Arc<Self>> {
        use crate::UnaryOp;

        let dtype = operand.dtype;
        ensure!(dtype != DType::Void, VoidTypeInOpSnafu);
        match op {
            UnaryOp::Neg => ensure!(!dtype.is_bool(), InvalidDTypeForUnaryOpSnafu { operation: op, dtype }),
            UnaryOp::Floor => ensure!(dtype.is_float(), InvalidDTypeForUnaryOpSnafu { operation: op, dtype }),
            UnaryOp::Not => {}
        }
        let out = if op == UnaryOp::Not { DType::Bool } else { dtype };
        if let Some(folded) = operand.as_const().and_then(|v| eval_unary_op(op, v, out)) {
            return Ok(Self::new(Op::Const(folded), out));
        }
        Ok(Self::new(Op::Unary(op, operand.clone()), out))
    }

    /// Checked binary operation.
    ///
    /// Operands must share a dtype. Bitwise operations reject floats.
    /// Constant operands are folded; `Index` arithmetic additionally drops
    /// `x + 0`, `x - 0`, `x * 1`, `x / 1` and turns `x * 0`, `x % 1` into `0`.
    #[track_caller]
    pub fn try_binary(op: crate::BinaryOp, lhs: &Arc<Self>, rhs: &Arc<Self>) -> Result<Arc<Self>> {
        use crate::BinaryOp::*;

        ensure!(lhs.dtype != DType::Void && rhs.dtype != DType::Void, VoidTypeInOpSnafu);
        ensure!(lhs.dtype == rhs.dtype, DTypeMismatchSnafu { lhs: lhs.dtype, rhs: rhs.dtype });
        let dtype = lhs.dtype;
        ensure!(
            !(op.is_bitwise() && dtype.is_float()),
            InvalidDTypeForBinaryOpSnafu { operation: op, dtypes: smallvec![lhs.dtype, rhs.dtype] }
        );
        let out = if op.yields_bool() { DType::Bool } else { dtype };

        let rhs_const = rhs.as_const();
        if matches!(op, Div | FloorDiv | Mod | FloorMod) && !dtype.is_float() {
            ensure!(!rhs_const.is_some_and(|v| !v.is_truthy()), DivisionByZeroSnafu);
        }

        if let (Some(a), Some(b)) = (lhs.as_const(), rhs_const)
            && let Some(folded) = eval_binary_op(op, a, b, out)
        {
            return Ok(Self::new(Op::Const(folded), out));
        }

        if dtype == DType::Index {
            let lhs_const = lhs.as_const().and_then(|v| v.as_i64());
            let rhs_const = rhs_const.and_then(|v| v.as_i64());
            match (op, lhs_const, rhs_const) {
                (Add, Some(0), _) | (Mul, Some(1), _) => return Ok(rhs.clone()),
                (Add | Sub, _, Some(0)) | (Mul | Div | FloorDiv, _, Some(1)) => return Ok(lhs.clone()),
                (Mul, Some(0), _) | (Mul, _, Some(0)) | (Mod | FloorMod, _, Some(1)) => return Ok(Self::index(0)),
                _ => {}
            }
        }

        Ok(Self::new(Op::Binary(op, lhs.clone(), rhs.clone()), out))
    }

    binary_ops! {
        try_add => Add,
        try_sub => Sub,
        try_mul => Mul,
        try_div => Div,
        try_mod => Mod,
        try_lt => Lt,
        try_gt => Gt,
        try_max => Max,
        try_min => Min,
    }

    /// Branchless select: `cond ? on_true : on_false`.
    pub fn try_select(cond: &Arc<Self>, on_true: &Arc<Self>, on_false: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(cond.dtype == DType::Bool, ConditionNotBoolSnafu { actual: cond.dtype });
        ensure!(on_true.dtype == on_false.dtype, DTypeMismatchSnafu { lhs: on_true.dtype, rhs: on_false.dtype });
        if let Some(c) = cond.as_const() {
            return Ok(if c.is_truthy() { on_true.clone() } else { on_false.clone() });
        }
        Ok(Self::new(
            Op::Select { cond: cond.clone(), on_true: on_true.clone(), on_false: on_false.clone() },
            on_true.dtype,
        ))
    }

    /// Call a named external function returning `dtype`.
    pub fn call_extern(name: impl Into<String>, args: &[Arc<Self>], dtype: DType) -> Arc<Self> {
        Self::new(Op::CallExtern { name: name.into(), args: args.iter().cloned().collect() }, dtype)
    }

    // =========================================================================
    // Memory
    // =========================================================================

    /// Read `tensor[indices]`. See [`Tensor::at`].
    pub fn tensor_load(tensor: &Tensor, indices: &[Arc<Self>]) -> Result<Arc<Self>> {
        ensure!(
            indices.len() == tensor.rank(),
            TensorRankMismatchSnafu { tensor: tensor.name(), expected: tensor.rank(), actual: indices.len() }
        );
        for index in indices {
            ensure!(index.dtype.is_int(), IndexTypeMismatchSnafu { actual: index.dtype });
        }
        Ok(Self::new(Op::TensorLoad { tensor: tensor.clone(), indices: indices.iter().cloned().collect() }, tensor.dtype()))
    }

    /// Read `buffer[index]` at a flat offset.
    pub fn try_load(buffer: &Arc<Buffer>, index: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(index.dtype.is_int(), IndexTypeMismatchSnafu { actual: index.dtype });
        Ok(Self::new(Op::Load { buffer: buffer.clone(), index: index.clone() }, buffer.dtype()))
    }

    /// Write `buffer[index] = value` at a flat offset.
    pub fn try_store(buffer: &Arc<Buffer>, index: &Arc<Self>, value: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(index.dtype.is_int(), IndexTypeMismatchSnafu { actual: index.dtype });
        ensure!(
            value.dtype == buffer.dtype(),
            StoreTypeMismatchSnafu { buffer: buffer.name(), expected: buffer.dtype(), actual: value.dtype }
        );
        Ok(Self::new(Op::Store { buffer: buffer.clone(), index: index.clone(), value: value.clone() }, DType::Void))
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// `for (var = min; var < min + extent; ++var) body`.
    pub fn for_loop(
        var: &Arc<Self>,
        min: &Arc<Self>,
        extent: &Arc<Self>,
        kind: ForKind,
        body: &Arc<Self>,
    ) -> Result<Arc<Self>> {
        for bound in [var, min, extent] {
            ensure!(bound.dtype.is_int(), IndexTypeMismatchSnafu { actual: bound.dtype });
        }
        Ok(Self::new(
            Op::For { var: var.clone(), min: min.clone(), extent: extent.clone(), kind, body: body.clone() },
            DType::Void,
        ))
    }

    pub fn if_then(cond: &Arc<Self>, body: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(cond.dtype == DType::Bool, ConditionNotBoolSnafu { actual: cond.dtype });
        Ok(Self::new(Op::IfThen { cond: cond.clone(), body: body.clone() }, DType::Void))
    }

    /// Scope the local `buffer` to `body`.
    pub fn allocate(buffer: &Arc<Buffer>, body: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(buffer.scope() == MemScope::Local, NotLocalBufferSnafu { buffer: buffer.name() });
        Ok(Self::new(Op::Allocate { buffer: buffer.clone(), body: body.clone() }, DType::Void))
    }

    /// Sequential statements. A single statement is returned unwrapped.
    pub fn block(mut stmts: Vec<Arc<Self>>) -> Arc<Self> {
        if stmts.len() == 1
            && let Some(only) = stmts.pop()
        {
            return only;
        }
        Self::new(Op::Block(stmts), DType::Void)
    }

    pub fn sequence(effect: &Arc<Self>, value: &Arc<Self>) -> Arc<Self> {
        Self::new(Op::Sequence { effect: effect.clone(), value: value.clone() }, value.dtype)
    }
}
