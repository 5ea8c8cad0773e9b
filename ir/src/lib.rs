//! Tensor-expression IR for the strata operator lowering layer.
//!
//! Operators describe their results as [`Tensor`]s whose elements are
//! [`Expr`] trees over axis variables. [`lower::lower_function`] turns a set
//! of output tensors into a [`LoweredFunc`]: explicit loop nests over flat
//! buffers that schedules can rewrite and [`interp::Interpreter`] can run.
//!
//! # Module Organization
//!
//! - [`types`] - Constant values, operation kinds, loop kinds, memory scopes
//! - [`expr`] - Expression nodes and checked constructors
//! - [`tensor`] / [`buffer`] - Tensors before lowering, buffers after
//! - [`lower`] - Tensor graph to loop nest lowering
//! - [`visit`] - Traversal, substitution and re-folding
//! - [`interp`] / [`externs`] - Reference execution
//! - [`error`] - Error types and result handling

pub mod buffer;
pub mod display;
pub mod error;
pub mod eval;
pub mod expr;
pub mod externs;
pub mod interp;
pub mod lower;
pub mod name;
pub mod shape;
pub mod sint;
pub mod tensor;
pub mod types;
pub mod visit;


pub use buffer::Buffer;
pub use error::{Error, Result};
pub use expr::{Expr, Op};
pub use interp::{BufferData, Interpreter};
pub use lower::{ArgKind, Argument, LoweredFunc, LoweredModule, lower_function};
pub use name::NameAllocator;
pub use shape::Shape;
pub use sint::{SInt, sint_prod};
pub use tensor::{Tensor, TensorKind};
pub use types::{BinaryOp, ConstValue, ForKind, GpuAxis, MemScope, UnaryOp};

pub use strata_dtype::DType;
