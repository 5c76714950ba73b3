/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// Scheduler control errors
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    #[error("Invalid scheduler configuration: {0}")]
    #[diagnostic(
        code(scheduler::invalid_config),
        help("Check SCHEDULER_* environment variables or the JSON configuration document.")
    )]
    InvalidConfig(String),

    #[error("Failed to spawn worker thread: {0}")]
    #[diagnostic(
        code(scheduler::worker_spawn_failed),
        help("The system may be out of threads or memory. View logs for details.")
    )]
    WorkerSpawn(#[source] std::io::Error),
}

/// Failure of a single task body, caught at the execution boundary
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "failure_type", content = "message", rename_all = "snake_case")]
pub enum TaskFailure {
    #[error("task returned an error: {0}")]
    #[diagnostic(code(task::error))]
    Error(String),

    #[error("task panicked: {0}")]
    #[diagnostic(
        code(task::panicked),
        help("The worker survived the panic; the task was not retried.")
    )]
    Panicked(String),
}

impl TaskFailure {
    /// Build a failure from a `catch_unwind` payload
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        TaskFailure::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_str() {
        let failure = TaskFailure::from_panic(Box::new("boom"));
        assert_eq!(failure, TaskFailure::Panicked("boom".to_string()));
    }

    #[test]
    fn test_panic_payload_string() {
        let failure = TaskFailure::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(failure, TaskFailure::Panicked("owned boom".to_string()));
    }

    #[test]
    fn test_panic_payload_opaque() {
        let failure = TaskFailure::from_panic(Box::new(42u32));
        assert!(matches!(failure, TaskFailure::Panicked(ref m) if m.contains("unknown")));
    }

    #[test]
    fn test_failure_serialization() {
        let failure = TaskFailure::Error("disk full".to_string());
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(json, r#"{"failure_type":"error","message":"disk full"}"#);
    }
}
