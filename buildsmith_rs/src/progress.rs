//! Run bookkeeping and the background throughput reporter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::SearchConfig;

/// Resume-offset and limit bookkeeping for the exhaustive pipeline.
/// Owned by the producer; workers never touch it.
#[derive(Debug)]
pub struct ProgressTracker {
    processed: u64,
    limit: Option<u64>,
    start_offset: u64,
}

impl ProgressTracker {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            processed: config.resume_offset,
            limit: config.max_combos.map(|limit| limit as u64),
            start_offset: config.resume_offset,
        }
    }

    /// Global enumeration cursor, including any resume offset.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Combinations enumerated by this run alone.
    pub fn processed_since_start(&self) -> u64 {
        self.processed.saturating_sub(self.start_offset)
    }

    /// Record an enumerated batch. Returns false once the configured
    /// limit is reached, signalling the producer to stop.
    pub fn record_batch(&mut self, enumerated: usize) -> bool {
        self.processed += enumerated as u64;
        self.limit
            .is_none_or(|limit| self.processed_since_start() < limit)
    }
}

/// Background reporter that logs throughput on a fixed tick.
///
/// Each tick reads the shared atomic counter and the elapsed wall time,
/// then emits one `info!` line. It takes no lock any worker holds, so it
/// never contends with the hot path. Teardown is deterministic: a
/// dedicated stop channel, separate from any cancellation signal the
/// workers race on, followed by a join.
pub struct ThroughputReporter {
    stop: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ThroughputReporter {
    pub fn spawn(label: &'static str, counter: Arc<AtomicU64>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(format!("progress-{label}"))
            .spawn(move || {
                let start = Instant::now();
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                    }
                    let count = counter.load(Ordering::Relaxed);
                    let elapsed = start.elapsed().as_secs_f32();
                    let rate = if elapsed > 0.0 {
                        count as f32 / elapsed
                    } else {
                        0.0
                    };
                    info!(
                        source = label,
                        count = %format_int(count),
                        rate = format!("{rate:.0}/s"),
                        elapsed = %format_duration(elapsed),
                        "Progress"
                    );
                }
            })
            .expect("failed to spawn progress reporter thread");
        Self {
            stop: stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the tick loop and wait for the reporter thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThroughputReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub(crate) fn format_int<T: Into<u128>>(value: T) -> String {
    let s = value.into().to_string();
    let len = s.len();
    if len <= 3 {
        return s;
    }
    let mut out = String::with_capacity(len + len / 3);
    let mut count = 0usize;
    for ch in s.chars().rev() {
        if count == 3 {
            out.push(',');
            count = 0;
        }
        out.push(ch);
        count += 1;
    }
    out.chars().rev().collect()
}

pub(crate) fn format_duration(seconds: f32) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "unknown".to_string();
    }
    let total = seconds.round() as u64;
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_int_groups_thousands() {
        assert_eq!(format_int(0u64), "0");
        assert_eq!(format_int(999u64), "999");
        assert_eq!(format_int(1_000u64), "1,000");
        assert_eq!(format_int(76_252_834u64), "76,252,834");
    }

    #[test]
    fn format_duration_picks_units() {
        assert_eq!(format_duration(12.0), "12s");
        assert_eq!(format_duration(95.0), "1m 35s");
        assert_eq!(format_duration(3_700.0), "1h 01m");
        assert_eq!(format_duration(f32::NAN), "unknown");
    }

    #[test]
    fn reporter_stops_promptly() {
        let counter = Arc::new(AtomicU64::new(0));
        let reporter = ThroughputReporter::spawn(
            "test",
            Arc::clone(&counter),
            Duration::from_millis(5),
        );
        counter.store(42, Ordering::Relaxed);
        std::thread::sleep(Duration::from_millis(20));
        // stop() joins the background thread; returning at all proves the
        // dedicated stop channel works.
        reporter.stop();
    }
}
