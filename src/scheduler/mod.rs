/*!
 * Task Scheduler
 * Single-worker priority scheduler with delayed submission and graceful shutdown
 */

use crate::core::clock::{Clock, MonotonicClock};
use crate::core::id::TaskIdGenerator;
use crate::core::types::SchedulerResult;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{JoinHandle, ThreadId};
use tracing::info;

mod config;
mod entry;
mod handle;
mod lifecycle;
mod operations;
mod queue;
mod stats;
mod task;
mod types;
mod worker;

pub use config::SchedulerConfig;
pub use handle::{TaskHandle, TaskStatus};
pub use operations::Submitter;
pub use stats::SchedulerStats;
pub use task::TaskOutput;
pub use types::{DelayPolicy, ShutdownMode, WorkerState};

use queue::PendingStore;
use stats::StatsTracker;

/// State guarded by the queue lock
#[derive(Debug)]
struct Inner {
    store: PendingStore,
    running: bool,
    stopping: bool,
    // Bumped on every start
    generation: u64,
    worker_state: WorkerState,
    // Set by start() before the worker runs, cleared when the worker exits
    worker_thread: Option<ThreadId>,
}

/// State shared by the scheduler, its worker, submitters, and handles
#[derive(Debug)]
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    work_ready: Condvar,
    stats: StatsTracker,
    ids: TaskIdGenerator,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl Shared {
    fn on_worker_thread(&self) -> bool {
        self.inner.lock().worker_thread == Some(std::thread::current().id())
    }
}

/// Priority task scheduler
///
/// Tasks run one at a time on a single background worker, most urgent
/// (lowest priority value) first, never before their eligible time.
/// Dropping the scheduler stops it.
#[derive(Debug)]
pub struct Scheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    // Serializes start/stop
    lifecycle: Mutex<()>,
}

impl Scheduler {
    /// Create a stopped scheduler with default configuration
    pub fn new() -> Self {
        Self::build(SchedulerConfig::default(), Arc::new(MonotonicClock))
    }

    /// Create a stopped scheduler with custom configuration
    pub fn with_config(config: SchedulerConfig) -> SchedulerResult<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    /// Create a stopped scheduler with custom configuration and time source
    pub fn with_clock(config: SchedulerConfig, clock: Arc<dyn Clock>) -> SchedulerResult<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    /// Create a stopped scheduler configured from SCHEDULER_* environment variables
    pub fn from_env() -> SchedulerResult<Self> {
        Self::with_config(SchedulerConfig::from_env()?)
    }

    fn build(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            delay_policy = %config.delay_policy,
            shutdown_mode = %config.shutdown_mode,
            max_wait_ms = config.max_wait.as_millis() as u64,
            "Task scheduler initialized"
        );

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    store: PendingStore::new(config.delay_policy),
                    running: false,
                    stopping: false,
                    generation: 0,
                    worker_state: WorkerState::Stopped,
                    worker_thread: None,
                }),
                work_ready: Condvar::new(),
                stats: StatsTracker::new(),
                ids: TaskIdGenerator::new(),
                clock,
                config,
            }),
            worker: Mutex::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    /// Configuration this scheduler was built with
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
