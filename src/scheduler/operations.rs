/*!
 * Scheduler Core Operations
 * Submit, cancel, and pending-count operations
 */

use super::handle::{TaskHandle, TaskSlot, TaskStatus};
use super::task::{box_body, Task, TaskOutput};
use super::{Scheduler, Shared};
use crate::core::id::TaskId;
use crate::core::limits::MAX_DELAY;
use crate::core::types::Priority;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

impl Shared {
    fn submit_after<F, R>(self: &Arc<Self>, body: F, delay: Duration, priority: Priority) -> TaskHandle
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutput,
    {
        let id = self.ids.generate_task_id();
        let slot = Arc::new(TaskSlot::new());
        let handle = TaskHandle::new(id, priority, Arc::clone(&slot), Arc::downgrade(self));
        let body = box_body(body);

        let mut inner = self.inner.lock();
        if !inner.running {
            drop(inner);
            self.stats.record_rejected();
            slot.finish(TaskStatus::Rejected);
            trace!(task_id = %id, priority, "Scheduler not running, task dropped");
            return handle;
        }

        // Counted before the worker can see the task, so added >= finished always holds
        self.stats.record_added();
        let now = self.clock.now();
        let eligible_at = now + delay.min(MAX_DELAY);
        inner
            .store
            .push(Task::new(id, priority, now, eligible_at, body, slot), now);
        drop(inner);

        self.work_ready.notify_all();
        debug!(
            task_id = %id,
            priority,
            delay_us = delay.as_micros() as u64,
            "Task submitted"
        );
        handle
    }

    pub(super) fn cancel(&self, id: TaskId) -> bool {
        let removed = self.inner.lock().store.remove(id);
        match removed {
            Some(task) => {
                // The top may have changed under a waiting worker
                self.work_ready.notify_all();
                self.stats.record_cancelled();
                task.slot().finish(TaskStatus::Cancelled);
                debug!(task_id = %id, "Task cancelled");
                true
            }
            None => false,
        }
    }

    fn pending_count(&self) -> usize {
        self.inner.lock().store.len()
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }
}

impl Scheduler {
    /// Submit a task that is eligible immediately
    ///
    /// Silently dropped (handle reports [`TaskStatus::Rejected`]) if the
    /// scheduler is not running.
    pub fn submit<F, R>(&self, body: F, priority: Priority) -> TaskHandle
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutput,
    {
        self.shared.submit_after(body, Duration::ZERO, priority)
    }

    /// Submit a task that becomes eligible after `delay`
    pub fn submit_after<F, R>(&self, body: F, delay: Duration, priority: Priority) -> TaskHandle
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutput,
    {
        self.shared.submit_after(body, delay, priority)
    }

    /// Number of tasks waiting in the pending store (snapshot)
    pub fn pending_count(&self) -> usize {
        self.shared.pending_count()
    }

    /// Cloneable submission endpoint, usable from other threads and from inside tasks
    pub fn submitter(&self) -> Submitter {
        Submitter {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Submission-only view of a scheduler
///
/// Cannot start or stop the scheduler. Submissions after the scheduler has
/// stopped (or been dropped) are rejected.
#[derive(Debug, Clone)]
pub struct Submitter {
    shared: Arc<Shared>,
}

impl Submitter {
    /// Submit a task that is eligible immediately
    pub fn submit<F, R>(&self, body: F, priority: Priority) -> TaskHandle
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutput,
    {
        self.shared.submit_after(body, Duration::ZERO, priority)
    }

    /// Submit a task that becomes eligible after `delay`
    pub fn submit_after<F, R>(&self, body: F, delay: Duration, priority: Priority) -> TaskHandle
    where
        F: FnOnce() -> R + Send + 'static,
        R: TaskOutput,
    {
        self.shared.submit_after(body, delay, priority)
    }

    /// Number of tasks waiting in the pending store (snapshot)
    pub fn pending_count(&self) -> usize {
        self.shared.pending_count()
    }

    /// True while the scheduler accepts submissions
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }
}
