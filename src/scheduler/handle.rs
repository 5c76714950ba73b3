/*!
 * Task Handles
 * Per-task status, outcome observation, and best-effort cancellation
 */

use super::Shared;
use crate::core::errors::TaskFailure;
use crate::core::id::TaskId;
use crate::core::types::Priority;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Lifecycle of a submitted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failure", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting in the pending store
    Pending,
    /// Body is executing on the worker
    Running,
    /// Body returned normally
    Completed,
    /// Body returned an error or panicked
    Failed(TaskFailure),
    /// Removed through [`TaskHandle::cancel`] before it ran
    Cancelled,
    /// Still pending when the scheduler stopped
    Discarded,
    /// Submitted while the scheduler was not running
    Rejected,
}

impl TaskStatus {
    /// True once the status can no longer change
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }
}

/// Status cell shared between a pending task and its handle
#[derive(Debug)]
pub(crate) struct TaskSlot {
    status: Mutex<TaskStatus>,
    finished: Condvar,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(TaskStatus::Pending),
            finished: Condvar::new(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status.lock().clone()
    }

    pub fn mark_running(&self) {
        *self.status.lock() = TaskStatus::Running;
    }

    pub fn finish(&self, status: TaskStatus) {
        debug_assert!(status.is_terminal());
        *self.status.lock() = status;
        self.finished.notify_all();
    }

    fn wait(&self) -> TaskStatus {
        let mut status = self.status.lock();
        while !status.is_terminal() {
            self.finished.wait(&mut status);
        }
        status.clone()
    }

    fn wait_until(&self, deadline: Instant) -> Option<TaskStatus> {
        let mut status = self.status.lock();
        while !status.is_terminal() {
            if self.finished.wait_until(&mut status, deadline).timed_out() {
                return status.is_terminal().then(|| status.clone());
            }
        }
        Some(status.clone())
    }
}

/// Handle returned by every submission
///
/// Dropping the handle does not affect the task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    priority: Priority,
    slot: Arc<TaskSlot>,
    shared: Weak<Shared>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, priority: Priority, slot: Arc<TaskSlot>, shared: Weak<Shared>) -> Self {
        Self {
            id,
            priority,
            slot,
            shared,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.slot.status()
    }

    pub fn is_finished(&self) -> bool {
        self.slot.status().is_terminal()
    }

    /// Block until the task reaches a terminal status
    ///
    /// Returns immediately for rejected tasks. A task that is never executed,
    /// cancelled, or discarded (scheduler neither stopped nor dropped) blocks forever;
    /// prefer [`TaskHandle::wait_timeout`] where that can happen.
    pub fn wait(&self) -> TaskStatus {
        self.slot.wait()
    }

    /// Block until the task reaches a terminal status or `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Option<TaskStatus> {
        self.slot.wait_until(Instant::now() + timeout)
    }

    /// Remove the task from the pending store if it has not started yet
    ///
    /// Returns `true` if this call cancelled it. Running or finished tasks
    /// are unaffected.
    pub fn cancel(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.cancel(self.id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed(TaskFailure::Error("x".into())).is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(TaskStatus::Discarded.is_terminal());
        assert!(TaskStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_wait_wakes_on_finish() {
        let slot = Arc::new(TaskSlot::new());
        let handle = TaskHandle::new(TaskId(3), 0, slot.clone(), Weak::new());

        let finisher = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            slot.mark_running();
            slot.finish(TaskStatus::Completed);
        });

        assert_eq!(handle.wait(), TaskStatus::Completed);
        assert!(handle.is_finished());
        finisher.join().unwrap();
    }

    #[test]
    fn test_wait_timeout_expires() {
        let handle = TaskHandle::new(TaskId(1), 0, Arc::new(TaskSlot::new()), Weak::new());
        assert_eq!(handle.wait_timeout(Duration::from_millis(20)), None);
        assert_eq!(handle.status(), TaskStatus::Pending);
    }

    #[test]
    fn test_cancel_without_scheduler_is_noop() {
        let handle = TaskHandle::new(TaskId(1), 0, Arc::new(TaskSlot::new()), Weak::new());
        assert!(!handle.cancel());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::Failed(TaskFailure::Panicked("oops".into())))
            .unwrap();
        assert_eq!(
            json,
            r#"{"status":"failed","failure":{"failure_type":"panicked","message":"oops"}}"#
        );
    }
}
