//! Exhaustive build enumeration over a bounded producer/consumer queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossbeam_channel::bounded;
use tracing::{debug, info, warn};

use crate::combinator::{CombinationBatcher, IndexCombination, combinations_count};
use crate::config::SearchConfig;
use crate::item::{ItemDescriptor, ItemPool};
use crate::progress::{ProgressTracker, ThroughputReporter, format_duration, format_int};

/// Totals from one exhaustive run.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineSummary {
    /// Combinations the producer enumerated this run.
    pub enumerated: u64,
    /// Combinations workers fully processed.
    pub processed: u64,
    /// Per-build evaluation failures, absorbed without stopping the pool.
    pub eval_errors: u64,
    pub elapsed_secs: f32,
}

/// Exhaustive enumeration engine: a single producer streams index-tuple
/// batches into a bounded queue, and a fixed pool of worker threads
/// drains it, applying the caller's per-build computation.
///
/// Queue capacity provides backpressure: enumeration can only run a few
/// batches ahead of the slowest worker. Order within a batch follows the
/// generator; completion order across workers is unspecified.
pub struct BuildPipeline {
    config: SearchConfig,
    pool: ItemPool,
}

impl BuildPipeline {
    pub fn new(config: SearchConfig, pool: ItemPool) -> Self {
        Self { config, pool }
    }

    /// Run with the default evaluator, which aggregates each build's
    /// summed gold cost.
    pub fn run(&self) -> Result<PipelineSummary> {
        self.run_with(|build| {
            let _total_gold: u64 = build.iter().map(|item| u64::from(item.gold_total)).sum();
            Ok(())
        })
    }

    /// Enumerate every remaining build and feed each one to `evaluate`.
    ///
    /// A failed evaluation is counted and logged, never fatal; only
    /// precondition violations abort before any work starts. All worker
    /// threads are joined before the summary is returned.
    pub fn run_with<F>(&self, evaluate: F) -> Result<PipelineSummary>
    where
        F: Fn(&[&ItemDescriptor]) -> Result<()> + Sync,
    {
        let pool_size = self.pool.len();
        let build_size = self.config.build_size;
        if build_size == 0 {
            bail!("build size must be at least 1");
        }
        if pool_size < build_size {
            bail!("not enough items: pool has {pool_size}, build needs {build_size}");
        }

        let workers = self.config.n_workers.max(1);
        let batch_size = self.config.batch_size.max(1);
        let resume_offset = self.config.resume_offset;
        let verbose = !self.config.quiet;

        let total = combinations_count(pool_size, build_size);
        let remaining = total.saturating_sub(u128::from(resume_offset));
        if remaining > u128::from(u64::MAX) {
            bail!(
                "remaining combination count ({remaining}) exceeds u64::MAX; \
                 shrink the pool or raise the resume offset"
            );
        }
        if verbose {
            info!(
                pool = %format_int(pool_size as u64),
                build_size = %format_int(build_size as u64),
                n_workers = %format_int(workers as u64),
                batch_size = %format_int(batch_size as u64),
                resume_offset = %format_int(resume_offset),
                total_combos = %format_int(total),
                remaining = %format_int(remaining),
                limit = ?self.config.max_combos,
                "Initialized build pipeline"
            );
        }

        let start_time = Instant::now();
        let processed = Arc::new(AtomicU64::new(0));
        let enumerated = AtomicU64::new(0);
        let eval_errors = AtomicU64::new(0);

        let reporter = if verbose {
            Some(ThroughputReporter::spawn(
                "pipeline",
                Arc::clone(&processed),
                Duration::from_millis(self.config.progress_interval_ms.max(1)),
            ))
        } else {
            None
        };

        // Capacity bounds how far enumeration runs ahead of consumption.
        let (batch_tx, batch_rx) = bounded::<Vec<IndexCombination>>(workers * 2);

        thread::scope(|scope| -> Result<()> {
            let mut tracker = ProgressTracker::new(&self.config);
            let enumerated = &enumerated;
            thread::Builder::new()
                .name("build-producer".to_string())
                .spawn_scoped(scope, move || {
                    let mut batcher = CombinationBatcher::new(pool_size, build_size, resume_offset);
                    while let Some(batch) = batcher.next_batch(batch_size) {
                        enumerated.fetch_add(batch.len() as u64, Ordering::Relaxed);
                        let keep_going = tracker.record_batch(batch.len());
                        if batch_tx.send(batch).is_err() {
                            // Every worker is gone; nothing left to feed.
                            break;
                        }
                        if !keep_going {
                            warn!("Reached configured combination limit; closing the batch queue early");
                            break;
                        }
                    }
                    // Dropping the sender closes the queue; workers drain
                    // what is already in flight and exit.
                })
                .context("failed to spawn producer thread")?;

            let items = self.pool.descriptors();
            for worker_id in 0..workers {
                let batch_rx = batch_rx.clone();
                let processed = &processed;
                let eval_errors = &eval_errors;
                let evaluate = &evaluate;
                thread::Builder::new()
                    .name(format!("build-worker-{worker_id}"))
                    .spawn_scoped(scope, move || {
                        let mut selection: Vec<&ItemDescriptor> = Vec::with_capacity(build_size);
                        for batch in batch_rx.iter() {
                            for indices in &batch {
                                selection.clear();
                                selection.extend(indices.iter().map(|&idx| &items[idx]));
                                if let Err(error) = evaluate(&selection) {
                                    eval_errors.fetch_add(1, Ordering::Relaxed);
                                    debug!(worker_id, ?error, "Build evaluation failed; continuing");
                                }
                                processed.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    })
                    .context("failed to spawn worker thread")?;
            }
            drop(batch_rx);
            Ok(())
        })?;

        if let Some(reporter) = reporter {
            reporter.stop();
        }

        let elapsed_secs = start_time.elapsed().as_secs_f32();
        let summary = PipelineSummary {
            enumerated: enumerated.load(Ordering::Relaxed),
            processed: processed.load(Ordering::Relaxed),
            eval_errors: eval_errors.load(Ordering::Relaxed),
            elapsed_secs,
        };
        if verbose {
            let rate = if elapsed_secs > 0.0 {
                summary.processed as f32 / elapsed_secs
            } else {
                0.0
            };
            info!(
                enumerated = %format_int(summary.enumerated),
                processed = %format_int(summary.processed),
                eval_errors = %format_int(summary.eval_errors),
                elapsed = %format_duration(elapsed_secs),
                rate = format!("{rate:.0}/s"),
                "Exhaustive enumeration complete"
            );
        }
        Ok(summary)
    }
}
