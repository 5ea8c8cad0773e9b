//! Injective schedules and the per-architecture selector.
//!
//! Injective kernels write each output element exactly once, so their loop
//! nests can be fused, split and annotated freely. Reductions that keep their
//! fold inside the element body (argmin, argmax) qualify as well: only the
//! output loops are touched, never the fold loop.

use tracing::{debug, warn};

use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::ir_schedule::IrSchedule;
use crate::target::{Arch, Target};
use strata_ir::visit::contains_loop;
use strata_ir::{DType, ForKind, GpuAxis};

/// CPU: fuse the output loops, vectorize an inner slice, parallelize the rest.
///
/// The vector split is taken only when the fused extent is a multiple of the
/// lane count and the element body holds no loop of its own.
pub fn cpu_schedule_injective(
    sch: &mut IrSchedule,
    function: &str,
    target: &Target,
    config: &ScheduleConfig,
) -> Result<()> {
    for nest in sch.loop_nests(function)? {
        if nest.is_empty() {
            continue;
        }
        let ids: Vec<u64> = nest.iter().map(|l| l.id()).collect();
        let fused = sch.fuse(function, &ids)?;
        let Some(extent) = fused.static_extent() else {
            debug!(function, loop_var = fused.name(), "symbolic extent, leaving loop serial");
            continue;
        };

        let dtype = sch.stored_dtype(function, fused.id())?.unwrap_or(DType::Float32);
        let lanes = target.vector_lanes(dtype);
        let mut outer = fused;
        if config.vectorize && lanes > 1 && extent > lanes && extent % lanes == 0 && !contains_loop(&outer.body) {
            let (o, inner) = sch.split(function, outer.id(), lanes)?;
            sch.vectorize(function, inner.id())?;
            outer = o;
        }
        if extent >= config.parallel_min {
            sch.parallel(function, outer.id())?;
        }
        debug!(function, extent, lanes, "applied cpu injective schedule");
    }
    Ok(())
}

/// GPU: fuse the output loops and bind them to `blockIdx.x` / `threadIdx.x`.
pub fn cuda_schedule_injective(
    sch: &mut IrSchedule,
    function: &str,
    target: &Target,
    config: &ScheduleConfig,
) -> Result<()> {
    let max_threads = target.max_threads_per_block.unwrap_or(1024);
    let threads = config.cuda_threads.unwrap_or(max_threads).clamp(1, max_threads);

    for nest in sch.loop_nests(function)? {
        if nest.is_empty() {
            continue;
        }
        let ids: Vec<u64> = nest.iter().map(|l| l.id()).collect();
        let fused = sch.fuse(function, &ids)?;
        let Some(extent) = fused.static_extent() else {
            warn!(function, loop_var = fused.name(), "symbolic extent, cannot bind gpu threads");
            continue;
        };

        if extent > threads {
            let (outer, inner) = sch.split(function, fused.id(), threads)?;
            sch.bind(function, outer.id(), ForKind::GpuBlock(GpuAxis::X))?;
            sch.bind(function, inner.id(), ForKind::GpuThread(GpuAxis::X))?;
        } else {
            sch.bind(function, fused.id(), ForKind::GpuThread(GpuAxis::X))?;
        }
        debug!(function, extent, threads, "applied cuda injective schedule");
    }
    Ok(())
}

/// Apply exactly one injective schedule to every function, chosen by `target.arch`.
///
/// Unrecognized targets and `config.noopt` leave the module unchanged.
#[tracing::instrument(skip_all, fields(arch = %target.arch))]
pub fn schedule_injective(sch: &mut IrSchedule, target: &Target, config: &ScheduleConfig) -> Result<()> {
    if config.noopt {
        debug!("schedules disabled");
        return Ok(());
    }
    for function in sch.function_names() {
        match target.arch {
            Arch::X86 => cpu_schedule_injective(sch, &function, target, config)?,
            Arch::NVGPU => cuda_schedule_injective(sch, &function, target, config)?,
            Arch::Unknown => {
                warn!(function = function.as_str(), "no injective schedule for target, leaving loops as lowered");
            }
        }
    }
    Ok(())
}
