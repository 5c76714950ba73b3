/*!
 * Scheduler Limits and Defaults
 *
 * Centralized location for scheduler-wide defaults and thresholds.
 */

use std::time::Duration;

/// Upper bound on a single timed wait of the worker (500ms)
/// The worker re-inspects the pending store at least this often
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(500);

/// Execution time above which a task is reported as slow (100ms)
pub const DEFAULT_SLOW_TASK_THRESHOLD: Duration = Duration::from_millis(100);

/// Default worker thread name
pub const DEFAULT_WORKER_NAME: &str = "task-scheduler-worker";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SCHEDULER_";

/// Longest accepted submission delay (100 years); longer delays are clamped
pub const MAX_DELAY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);
