//! Unique-sample mode: racing workers for a never-before-seen build.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use ahash::AHashSet;
use rand::seq::index;
use thiserror::Error;
use tracing::debug;

use crate::combinator::combinations_count;
use crate::item::ItemDescriptor;
use crate::key::{MalformedItemId, canonical_key};

/// Failure taxonomy for unique-sample mode. Only these surface to the
/// caller; per-draw problems (malformed ids) are absorbed and counted.
#[derive(Debug, Error)]
pub enum PickError {
    #[error("not enough items: pool has {have}, build needs {need}")]
    NotEnoughItems { have: usize, need: usize },
    #[error("all {total} possible builds have already been issued")]
    Exhausted { total: u128 },
    #[error("no novel build found within {attempts} attempts")]
    AttemptBudgetExhausted { attempts: u64 },
}

/// One winning build from a unique-sample race.
#[derive(Clone, Debug)]
pub struct BuildSelection {
    pub items: Vec<ItemDescriptor>,
    pub key: String,
}

/// Canonical keys already issued by this picker. All mutation is
/// serialized behind the picker's mutex; a critical section is a
/// membership test plus at most one insert, never a random draw.
#[derive(Debug, Default)]
struct UsedCombinations {
    keys: AHashSet<String>,
}

/// Draws never-before-issued random builds from a fixed item pool by
/// racing independent worker threads against a shared registry.
///
/// The registry and every counter live on the picker value; lifecycle is
/// tied to this instance, not the process.
pub struct Picker {
    items: Vec<ItemDescriptor>,
    build_size: usize,
    total_combos: u128,
    used: Mutex<UsedCombinations>,
    attempts: Arc<AtomicU64>,
    malformed_skips: Arc<AtomicU64>,
}

impl Picker {
    pub fn new(items: Vec<ItemDescriptor>, build_size: usize) -> Self {
        let total_combos = combinations_count(items.len(), build_size);
        Self {
            items,
            build_size,
            total_combos,
            used: Mutex::default(),
            attempts: Arc::new(AtomicU64::new(0)),
            malformed_skips: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Total number of distinct builds the pool admits.
    pub fn total_combos(&self) -> u128 {
        self.total_combos
    }

    /// How many distinct builds this picker has issued so far.
    pub fn issued(&self) -> usize {
        self.used.lock().expect("picker registry poisoned").keys.len()
    }

    /// Lifetime draw attempts across all calls, for diagnostics and the
    /// throughput reporter.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Shared attempt counter, suitable for a `ThroughputReporter`.
    pub fn attempt_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.attempts)
    }

    /// Draws discarded because an item id failed numeric parsing. A
    /// pathological pool shows up here instead of failing the call; note
    /// that such skips also bias sampling away from the malformed items.
    pub fn malformed_skips(&self) -> u64 {
        self.malformed_skips.load(Ordering::Relaxed)
    }

    /// Pick one build no previous call on this picker has returned.
    ///
    /// This is blind rejection sampling: as the registry fills, expected
    /// retries grow without bound, and the loop runs until a novel build
    /// is found. Callers that need the tail of the space should
    /// enumerate exhaustively instead; callers that need guaranteed
    /// termination should use [`Picker::pick_unique_with_budget`].
    pub fn pick_unique(&self, workers: usize) -> Result<BuildSelection, PickError> {
        self.pick_unique_with_budget(workers, None)
    }

    /// Like [`Picker::pick_unique`], but gives up with
    /// [`PickError::AttemptBudgetExhausted`] once roughly `max_attempts`
    /// draws have been made across all workers.
    pub fn pick_unique_with_budget(
        &self,
        workers: usize,
        max_attempts: Option<u64>,
    ) -> Result<BuildSelection, PickError> {
        let pool_size = self.items.len();
        let build_size = self.build_size;
        if build_size == 0 || pool_size < build_size {
            return Err(PickError::NotEnoughItems {
                have: pool_size,
                need: build_size,
            });
        }
        {
            let used = self.used.lock().expect("picker registry poisoned");
            if used.keys.len() as u128 >= self.total_combos {
                return Err(PickError::Exhausted {
                    total: self.total_combos,
                });
            }
        }

        let workers = workers.max(1);
        let cancelled = AtomicBool::new(false);
        let call_attempts = AtomicU64::new(0);
        // Rendezvous slot for the single winning selection.
        let (result_tx, result_rx) = mpsc::sync_channel::<BuildSelection>(1);

        thread::scope(|scope| {
            for worker_id in 0..workers {
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                let call_attempts = &call_attempts;
                thread::Builder::new()
                    .name(format!("picker-worker-{worker_id}"))
                    .spawn_scoped(scope, move || {
                        let mut rng = rand::rng();
                        loop {
                            // Every iteration boundary observes cancellation;
                            // once a winner exists nobody else touches the
                            // registry again.
                            if cancelled.load(Ordering::Acquire) {
                                return;
                            }
                            let made = call_attempts.fetch_add(1, Ordering::Relaxed) + 1;
                            if let Some(budget) = max_attempts {
                                if made > budget {
                                    return;
                                }
                            }
                            self.attempts.fetch_add(1, Ordering::Relaxed);

                            // Uniform draw of `build_size` distinct indices.
                            let drawn = index::sample(&mut rng, pool_size, build_size);
                            let candidate: Vec<&ItemDescriptor> =
                                drawn.iter().map(|idx| &self.items[idx]).collect();
                            let key = match canonical_key(candidate.iter().copied()) {
                                Ok(key) => key,
                                Err(MalformedItemId { id }) => {
                                    // A bad id spoils only this draw.
                                    self.malformed_skips.fetch_add(1, Ordering::Relaxed);
                                    debug!(
                                        worker_id,
                                        item_id = %id,
                                        "Discarded draw with unparseable item id"
                                    );
                                    continue;
                                }
                            };

                            let mut used =
                                self.used.lock().expect("picker registry poisoned");
                            // A winner may have been chosen while this
                            // thread waited on the lock; leave the
                            // registry untouched in that case.
                            if cancelled.load(Ordering::Acquire) {
                                return;
                            }
                            if used.keys.contains(&key) {
                                continue;
                            }
                            // Novel build: first worker to flip the flag wins
                            // and makes the one registry insert for this call.
                            if cancelled
                                .compare_exchange(
                                    false,
                                    true,
                                    Ordering::AcqRel,
                                    Ordering::Acquire,
                                )
                                .is_ok()
                            {
                                used.keys.insert(key.clone());
                                drop(used);
                                let items =
                                    candidate.into_iter().cloned().collect();
                                let _ = result_tx.send(BuildSelection { items, key });
                            }
                            return;
                        }
                    })
                    .expect("failed to spawn picker worker thread");
            }
            drop(result_tx);
            // The scope joins every worker, winners and losers alike,
            // before the result is read.
        });

        result_rx
            .try_recv()
            .map_err(|_| PickError::AttemptBudgetExhausted {
                attempts: call_attempts.load(Ordering::Relaxed),
            })
    }
}
