/*!
 * Scheduler Statistics
 * Execution counters and timing behind their own lock. The submission
 * counter is atomic, so submitters never wait on statistics updates.
 */

use super::Scheduler;
use parking_lot::Mutex;
use serde::Serialize;
use serde_with::{serde_as, DurationMicroSeconds};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of scheduler statistics
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub tasks_added: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub tasks_cancelled: u64,
    pub tasks_discarded: u64,
    pub tasks_rejected: u64,
    #[serde_as(as = "DurationMicroSeconds<u64>")]
    #[serde(rename = "total_execution_time_us")]
    pub total_execution_time: Duration,
    #[serde_as(as = "DurationMicroSeconds<u64>")]
    #[serde(rename = "average_execution_time_us")]
    pub average_execution_time: Duration,
}

impl SchedulerStats {
    /// Tasks whose body has run, successfully or not
    #[inline]
    pub fn tasks_finished(&self) -> u64 {
        self.tasks_completed + self.tasks_failed
    }

    /// Accepted tasks that have not yet run, been cancelled, or been discarded
    #[inline]
    pub fn tasks_outstanding(&self) -> u64 {
        self.tasks_added
            .saturating_sub(self.tasks_finished() + self.tasks_cancelled + self.tasks_discarded)
    }
}

/// Mean duration, zero when nothing has finished
pub(crate) fn average(total: Duration, count: u64) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / u128::from(count);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Statistics aggregator
///
/// Lock order: the queue lock may be held while calling in, never the reverse.
#[derive(Debug, Default)]
pub(crate) struct StatsTracker {
    added: AtomicU64,
    inner: Mutex<SchedulerStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock-free; called on the submit path
    pub fn record_added(&self) {
        self.added.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_rejected(&self) {
        self.inner.lock().tasks_rejected += 1;
    }

    pub fn record_cancelled(&self) {
        self.inner.lock().tasks_cancelled += 1;
    }

    pub fn record_discarded(&self, count: u64) {
        self.inner.lock().tasks_discarded += count;
    }

    /// Account for one executed task body
    pub fn record_execution(&self, succeeded: bool, elapsed: Duration) {
        let mut stats = self.inner.lock();
        if succeeded {
            stats.tasks_completed += 1;
        } else {
            stats.tasks_failed += 1;
        }
        stats.total_execution_time += elapsed;
        stats.average_execution_time = average(stats.total_execution_time, stats.tasks_finished());
    }

    pub fn snapshot(&self) -> SchedulerStats {
        let mut stats = *self.inner.lock();
        // Loaded after the finished counters: every finished task was added first
        stats.tasks_added = self.added.load(Ordering::SeqCst);
        stats
    }
}

impl Scheduler {
    /// Get scheduler statistics (snapshot copy)
    pub fn stats(&self) -> SchedulerStats {
        self.shared.stats.snapshot()
    }
}
