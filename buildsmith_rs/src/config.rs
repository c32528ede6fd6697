use serde::{Deserialize, Serialize};

/// Tuning and bookkeeping knobs for a search run.
///
/// Worker count, batch size, and queue capacity only affect throughput;
/// they never change which builds are produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of items per build (the fixed subset size).
    #[serde(default = "default_build_size")]
    pub build_size: usize,
    /// Worker threads draining the batch queue, or racing for a sample.
    #[serde(default = "default_n_workers")]
    pub n_workers: usize,
    /// Combinations per batch flowing through the bounded queue.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Enumeration rank to resume from (exhaustive mode only).
    #[serde(default)]
    pub resume_offset: u64,
    /// Optional cap on combinations to enumerate this run.
    #[serde(default)]
    pub max_combos: Option<usize>,
    #[serde(default)]
    pub quiet: bool,
    /// Tick interval for the background throughput reporter.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    /// Optional retry budget for unique-sample mode. `None` leaves the
    /// sampler's blind retry loop unbounded.
    #[serde(default)]
    pub max_attempts: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            build_size: default_build_size(),
            n_workers: default_n_workers(),
            batch_size: default_batch_size(),
            resume_offset: 0,
            max_combos: None,
            quiet: false,
            progress_interval_ms: default_progress_interval_ms(),
            max_attempts: None,
        }
    }
}

const fn default_build_size() -> usize {
    6
}

fn default_n_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

const fn default_batch_size() -> usize {
    10_000
}

const fn default_progress_interval_ms() -> u64 {
    2_000
}
