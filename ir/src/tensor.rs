//! Tensors: named, shaped, typed nodes of a computation.
//!
//! A tensor is either a placeholder (an input bound at run time) or a compute
//! tensor whose element at `[i0, i1, ...]` is given by an expression over the
//! axis variables. Compute bodies refer to other tensors through
//! [`Op::TensorLoad`](crate::Op::TensorLoad); lowering turns that graph into
//! loop nests over flat buffers.

use std::sync::Arc;

use strata_dtype::DType;

use crate::expr::next_id;
use crate::shape::{self, Shape};
use crate::{Expr, Result};

#[derive(Debug)]
pub enum TensorKind {
    Placeholder,
    Compute { axes: Vec<Arc<Expr>>, body: Arc<Expr> },
}

struct TensorNode {
    id: u64,
    name: String,
    dtype: DType,
    shape: Shape,
    kind: TensorKind,
}

/// Cheap-to-clone handle to a tensor node.
#[derive(Clone)]
pub struct Tensor(Arc<TensorNode>);

impl Tensor {
    pub fn placeholder(name: impl Into<String>, dtype: DType, shape: Shape) -> Self {
        Self(Arc::new(TensorNode { id: next_id(), name: name.into(), dtype, shape, kind: TensorKind::Placeholder }))
    }

    /// Define a tensor elementwise.
    ///
    /// `body` receives one `Index` variable per dimension and returns the
    /// element expression; its dtype becomes the tensor dtype.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use strata_ir::{Expr, Tensor, shape::from_static};
    /// # use strata_dtype::DType;
    /// let a = Tensor::placeholder("a", DType::Float32, from_static(&[4]));
    /// let doubled = Tensor::compute("doubled", from_static(&[4]), |i| {
    ///     let x = a.at(i)?;
    ///     x.try_add(&x)
    /// })
    /// .unwrap();
    /// assert_eq!(doubled.dtype(), DType::Float32);
    /// ```
    pub fn compute<E, F>(name: impl Into<String>, shape: Shape, body: F) -> Result<Self, E>
    where
        F: FnOnce(&[Arc<Expr>]) -> Result<Arc<Expr>, E>,
    {
        let axes: Vec<_> = (0..shape.len()).map(|k| Expr::var(format!("i{k}"), DType::Index)).collect();
        let body = body(&axes)?;
        Ok(Self(Arc::new(TensorNode {
            id: next_id(),
            name: name.into(),
            dtype: body.dtype(),
            shape,
            kind: TensorKind::Compute { axes, body },
        })))
    }

    /// Element read `self[indices]`.
    pub fn at(&self, indices: &[Arc<Expr>]) -> Result<Arc<Expr>> {
        Expr::tensor_load(self, indices)
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn dtype(&self) -> DType {
        self.0.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }

    pub fn rank(&self) -> usize {
        self.0.shape.len()
    }

    pub fn kind(&self) -> &TensorKind {
        &self.0.kind
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.0.kind, TensorKind::Placeholder)
    }

    /// Tensors read directly by this tensor's body, in first-use order.
    pub fn inputs(&self) -> Vec<Tensor> {
        let mut found: Vec<Tensor> = Vec::new();
        if let TensorKind::Compute { body, .. } = &self.0.kind {
            crate::visit::walk(body, &mut |expr| {
                if let crate::Op::TensorLoad { tensor, .. } = expr.op()
                    && !found.iter().any(|t| t.id() == tensor.id())
                {
                    found.push(tensor.clone());
                }
            });
        }
        found
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Tensor {}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("dtype", &self.0.dtype)
            .field("shape", &shape::format_shape(&self.0.shape))
            .field("placeholder", &self.is_placeholder())
            .finish()
    }
}
