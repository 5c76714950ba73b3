/*!
 * Task Scheduler Library
 * In-process priority task scheduler with delayed submission
 */

pub mod core;
pub mod monitoring;
pub mod scheduler;

// Re-exports
pub use crate::core::{
    Clock, ManualClock, MonotonicClock, Priority, SchedulerError, SchedulerResult, TaskFailure,
    TaskId, TaskIdGenerator,
};
pub use monitoring::{init_tracing, try_init_tracing};
pub use scheduler::{
    DelayPolicy, Scheduler, SchedulerConfig, SchedulerStats, ShutdownMode, Submitter, TaskHandle,
    TaskOutput, TaskStatus, WorkerState,
};
