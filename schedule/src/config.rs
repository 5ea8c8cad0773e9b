//! Schedule configuration.
//!
//! Typed configuration with a bon builder and environment variable fallbacks.

use bon::bon;
use once_cell::sync::Lazy;

/// Knobs of the injective schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Skip injective schedules entirely.
    pub noopt: bool,
    /// Minimum fused extent before a CPU loop is marked parallel.
    pub parallel_min: usize,
    /// Threads per block for GPU schedules; `None` uses the target maximum.
    pub cuda_threads: Option<usize>,
    /// Split off and vectorize an inner loop on CPU targets.
    pub vectorize: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { noopt: false, parallel_min: 1024, cuda_threads: None, vectorize: true }
    }
}

static GLOBAL: Lazy<ScheduleConfig> = Lazy::new(ScheduleConfig::from_env);

#[bon]
impl ScheduleConfig {
    /// Create a schedule configuration with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default = false)] noopt: bool,
        #[builder(default = 1024)] parallel_min: usize,
        cuda_threads: Option<usize>,
        #[builder(default = true)] vectorize: bool,
    ) -> Self {
        Self { noopt, parallel_min, cuda_threads, vectorize }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `STRATA_NOOPT=1` - Leave lowered loops unscheduled
    /// * `STRATA_PARALLEL_MIN=N` - Parallelize CPU loops with at least N iterations (default: 1024)
    /// * `STRATA_CUDA_THREADS=N` - Threads per block on GPU (default: target maximum)
    /// * `STRATA_VECTORIZE=0` - Disable CPU vectorization
    pub fn from_env() -> Self {
        let noopt = std::env::var("STRATA_NOOPT").is_ok_and(|v| v != "0");
        let parallel_min = std::env::var("STRATA_PARALLEL_MIN").ok().and_then(|s| s.parse().ok()).unwrap_or(1024);
        let cuda_threads = std::env::var("STRATA_CUDA_THREADS").ok().and_then(|s| s.parse().ok()).filter(|n| *n > 0);
        let vectorize = std::env::var("STRATA_VECTORIZE").map_or(true, |v| v != "0");

        Self { noopt, parallel_min, cuda_threads, vectorize }
    }

    /// Process-wide configuration, read from the environment once.
    pub fn global() -> &'static ScheduleConfig {
        &GLOBAL
    }
}
