//! Symbolic Integer (SInt) - dimensions that can be either concrete or symbolic.
//!
//! Shapes may carry dimensions that are only known at run time (a batch size
//! bound to a variable). Every operator that needs static loop bounds checks
//! [`SInt::as_const`] before synthesizing loops.

use std::sync::Arc;

use strata_dtype::DType;

use crate::{ConstValue, Expr, Result};

/// Symbolic Integer - either a concrete value or a symbolic expression.
///
/// # Examples
///
/// ```rust
/// # use strata_ir::{Expr, SInt};
/// # use strata_dtype::DType;
/// let static_dim = SInt::from(32);
/// assert_eq!(static_dim.as_const(), Some(32));
///
/// let batch = SInt::from(Expr::var("batch", DType::Index));
/// assert!(batch.is_symbolic());
/// ```
#[derive(Debug, Clone)]
pub enum SInt {
    /// Concrete compile-time constant dimension.
    Const(usize),

    /// Symbolic runtime expression (integer dtype).
    Symbolic(Arc<Expr>),
}

// Symbolic dimensions compare by node identity.
impl PartialEq for SInt {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SInt::Const(a), SInt::Const(b)) => a == b,
            (SInt::Symbolic(a), SInt::Symbolic(b)) => a.id == b.id,
            (SInt::Const(_), SInt::Symbolic(_)) | (SInt::Symbolic(_), SInt::Const(_)) => false,
        }
    }
}

impl Eq for SInt {}

impl std::hash::Hash for SInt {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            SInt::Const(v) => v.hash(state),
            SInt::Symbolic(expr) => expr.id.hash(state),
        }
    }
}

impl SInt {
    pub fn is_symbolic(&self) -> bool {
        matches!(self, SInt::Symbolic(_))
    }

    /// Get concrete value if this is a constant, None otherwise.
    ///
    /// A symbolic dimension whose expression folded to a constant counts as
    /// constant.
    pub fn as_const(&self) -> Option<usize> {
        match self {
            SInt::Const(v) => Some(*v),
            SInt::Symbolic(expr) => expr.as_const().and_then(|c| c.as_i64()).and_then(|v| usize::try_from(v).ok()),
        }
    }

    /// Convert to an `Index` expression.
    pub fn to_expr(&self) -> Arc<Expr> {
        match self {
            SInt::Const(v) => Expr::index(*v as i64),
            SInt::Symbolic(expr) if expr.dtype() == DType::Index => expr.clone(),
            SInt::Symbolic(expr) => Expr::cast(expr, DType::Index),
        }
    }

    /// Simplify to `Const` when the expression folded.
    pub fn simplify(&self) -> SInt {
        match self.as_const() {
            Some(v) => SInt::Const(v),
            None => self.clone(),
        }
    }
}

impl From<usize> for SInt {
    fn from(value: usize) -> Self {
        SInt::Const(value)
    }
}

impl From<Arc<Expr>> for SInt {
    fn from(expr: Arc<Expr>) -> Self {
        match expr.as_const().and_then(|c: ConstValue| c.as_i64()).and_then(|v| usize::try_from(v).ok()) {
            Some(v) => SInt::Const(v),
            None => SInt::Symbolic(expr),
        }
    }
}

impl std::fmt::Display for SInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SInt::Const(v) => write!(f, "{v}"),
            SInt::Symbolic(expr) => write!(f, "{expr}"),
        }
    }
}

/// Product of dimensions as an `Index` expression, folded when all are constant.
pub fn sint_prod(dims: &[SInt]) -> Result<SInt> {
    if let Some(values) = dims.iter().map(SInt::as_const).collect::<Option<Vec<_>>>() {
        return Ok(SInt::Const(values.iter().product()));
    }
    let mut acc = Expr::index(1);
    for dim in dims {
        acc = Expr::try_binary(crate::BinaryOp::Mul, &acc, &dim.to_expr())?;
    }
    Ok(SInt::from(acc))
}
