//! Compilation targets.
//!
//! A [`Target`] carries the architecture used to select schedules plus the
//! device limits those schedules respect.

use strata_dtype::DType;

/// Architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Arch {
    X86,
    #[strum(serialize = "nvgpu")]
    NVGPU,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub arch: Arch,
    /// SIMD register width in bits, 0 when the target does not vectorize loops.
    pub vector_bits: usize,
    /// Maximum threads per block, `None` for CPU targets.
    pub max_threads_per_block: Option<usize>,
    /// Maximum blocks in grid dimension x, `None` for CPU targets.
    pub max_blocks: Option<usize>,
}

impl Target {
    /// Host CPU with AVX2-width vectors.
    pub fn host() -> Self {
        Self { arch: Arch::X86, vector_bits: 256, max_threads_per_block: None, max_blocks: None }
    }

    /// NVIDIA GPU (SM80-class limits).
    pub fn nvgpu() -> Self {
        Self { arch: Arch::NVGPU, vector_bits: 0, max_threads_per_block: Some(1024), max_blocks: Some(2147483647) }
    }

    /// A target no schedule knows about.
    pub fn unknown() -> Self {
        Self { arch: Arch::Unknown, vector_bits: 0, max_threads_per_block: None, max_blocks: None }
    }

    /// Number of `dtype` lanes in one vector register, at least 1.
    pub fn vector_lanes(&self, dtype: DType) -> usize {
        let bits = dtype.bytes().max(1) * 8;
        (self.vector_bits / bits).max(1)
    }

    /// Backend prefix of extern symbols; unrecognized targets use host externs.
    pub fn extern_backend(&self) -> &'static str {
        match self.arch {
            Arch::NVGPU => "cuda",
            Arch::X86 | Arch::Unknown => "host",
        }
    }

    /// Registry name of an operator strategy on this target, e.g. `strategy.argmin.x86`.
    pub fn strategy_name(&self, op: &str) -> String {
        format!("strategy.{op}.{}", self.arch)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}
