//! Targets, staging and loop-nest schedules for strata.
//!
//! # Module Organization
//!
//! - [`target`] - Architecture and device limits
//! - [`stage`] - Tensors collected by a compute phase
//! - [`ir_schedule`] - Schedule primitives (fuse, split, vectorize, parallel, unroll, bind)
//! - [`injective`] - CPU/GPU injective schedules and the selector
//! - [`config`] - Schedule configuration with environment fallbacks

pub mod config;
pub mod error;
pub mod injective;
pub mod ir_schedule;
pub mod stage;
pub mod target;


pub use config::ScheduleConfig;
pub use error::{Error, Result};
pub use injective::{cpu_schedule_injective, cuda_schedule_injective, schedule_injective};
pub use ir_schedule::{IrSchedule, LoopInfo, ScheduleStep};
pub use stage::StageMap;
pub use target::{Arch, Target};
