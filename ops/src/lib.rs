//! Operator lowering for strata.
//!
//! For each operator this crate provides shape, dtype and layout inference
//! plus a strategy that synthesizes the operator's kernel and schedules it
//! for a target.
//!
//! # Module Organization
//!
//! - [`attr`] - Untyped attribute maps and typed operator configs
//! - [`shape`] - Broadcast, reduction and broadcast-to shape algebra
//! - [`infer`] / [`layout`] - Element type and layout inference
//! - [`primitive`] - Broadcast-binary primitive table
//! - [`kernel`] - Kernel synthesizers (broadcast, arg reduce, reciprocal, broadcast_to)
//! - [`strategy`] - Two-phase compute/schedule strategies
//! - [`registry`] - Operator descriptors and the process-wide registry
//!
//! # Example
//!
//! ```rust
//! use strata_dtype::DType;
//! use strata_ir::{NameAllocator, Tensor, shape::from_static};
//! use strata_ops::{AttrMap, registry};
//! use strata_schedule::Target;
//!
//! let op = registry().get("argmin").unwrap();
//! let attrs = AttrMap::new().with("axis", 1i64);
//! let shapes = op.infer_shape(&[vec![2, 3]], &attrs).unwrap();
//! assert_eq!(shapes, vec![vec![2]]);
//!
//! let strategy = op.strategy(&attrs, &[DType::Int32], &shapes, &Target::host()).unwrap();
//! let imp = strategy.best().unwrap();
//! assert_eq!(imp.name, "strategy.argmin.x86");
//!
//! let input = Tensor::placeholder("x", DType::Float32, from_static(&[2, 3]));
//! let computed = imp.compute(&[input], None, &mut NameAllocator::new()).unwrap();
//! let module = imp.schedule(&computed).unwrap();
//! assert_eq!(module.functions.len(), 1);
//! ```

pub mod attr;
mod builtin;
pub mod error;
pub mod infer;
pub mod kernel;
pub mod layout;
pub mod primitive;
pub mod registry;
pub mod shape;
pub mod strategy;


pub use attr::{ArgReduceConfig, AttrMap, AttrValue, BroadcastConfig, BroadcastToConfig};
pub use error::{Error, Result};
pub use infer::{DTypeRule, infer_dtype};
pub use layout::{InferredLayouts, Layout};
pub use primitive::BinaryPrimitive;
pub use registry::{OpDescriptor, OpKind, OpPatternKind, OpRegistry, registry};
pub use shape::{broadcast_shape, broadcast_to_shape, normalize_axis, reduce_shape};
pub use strategy::{ComputeOutput, OpImpl, OpStrategy, StrategyContext, assemble_strategy};
