use std::sync::Arc;

use strata_dtype::DType;

use crate::expr::next_id;
use crate::shape::{self, Shape};
use crate::{MemScope, SInt};

/// Flat storage addressed by [`Op::Load`](crate::Op::Load) and
/// [`Op::Store`](crate::Op::Store).
///
/// Two buffers are the same buffer iff their ids match.
#[derive(Debug)]
pub struct Buffer {
    id: u64,
    name: String,
    dtype: DType,
    shape: Shape,
    scope: MemScope,
}

impl Buffer {
    pub fn new(name: impl Into<String>, dtype: DType, shape: Shape, scope: MemScope) -> Arc<Self> {
        Arc::new(Self { id: next_id(), name: name.into(), dtype, shape, scope })
    }

    /// Private scratch storage of `len` elements.
    pub fn local(name: impl Into<String>, dtype: DType, len: usize) -> Arc<Self> {
        Self::new(name, dtype, [SInt::from(len)].into_iter().collect(), MemScope::Local)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn scope(&self) -> MemScope {
        self.scope
    }

    /// Element count, `None` for symbolic shapes.
    pub fn len(&self) -> Option<usize> {
        shape::numel(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Buffer {}
