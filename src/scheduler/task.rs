/*!
 * Task Record
 * Immutable unit of submitted work: id, body, priority, eligible time
 */

use super::handle::TaskSlot;
use crate::core::errors::TaskFailure;
use crate::core::id::TaskId;
use crate::core::types::Priority;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Type-erased task body
pub(crate) type TaskBody = Box<dyn FnOnce() -> Result<(), TaskFailure> + Send + 'static>;

/// Return types accepted from a task body
///
/// `()` always succeeds. `Result<T, E>` fails with `E`'s `Display` text
/// (alternate form, so error chains such as `anyhow::Error` keep their causes).
pub trait TaskOutput {
    fn into_result(self) -> Result<(), TaskFailure>;
}

impl TaskOutput for () {
    #[inline]
    fn into_result(self) -> Result<(), TaskFailure> {
        Ok(())
    }
}

impl<T, E: fmt::Display> TaskOutput for Result<T, E> {
    fn into_result(self) -> Result<(), TaskFailure> {
        self.map(|_| ())
            .map_err(|e| TaskFailure::Error(format!("{:#}", e)))
    }
}

pub(crate) fn box_body<F, R>(body: F) -> TaskBody
where
    F: FnOnce() -> R + Send + 'static,
    R: TaskOutput,
{
    Box::new(move || body().into_result())
}

/// Pending task
///
/// Never mutated after construction; the store reorders tasks structurally.
pub(crate) struct Task {
    id: TaskId,
    priority: Priority,
    submitted_at: Instant,
    eligible_at: Instant,
    body: TaskBody,
    slot: Arc<TaskSlot>,
}

impl Task {
    pub fn new(
        id: TaskId,
        priority: Priority,
        submitted_at: Instant,
        eligible_at: Instant,
        body: TaskBody,
        slot: Arc<TaskSlot>,
    ) -> Self {
        Self {
            id,
            priority,
            submitted_at,
            eligible_at,
            body,
            slot,
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    #[inline]
    pub fn eligible_at(&self) -> Instant {
        self.eligible_at
    }

    #[inline]
    pub fn is_eligible(&self, now: Instant) -> bool {
        self.eligible_at <= now
    }

    pub fn slot(&self) -> &Arc<TaskSlot> {
        &self.slot
    }

    /// Consume the task for execution
    pub fn into_parts(self) -> (TaskBody, Arc<TaskSlot>) {
        (self.body, self.slot)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("submitted_at", &self.submitted_at)
            .field("eligible_at", &self.eligible_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Task with a no-op body, for store and ordering tests
    pub fn task(id: u64, priority: Priority, eligible_at: Instant) -> Task {
        Task::new(
            TaskId(id),
            priority,
            eligible_at,
            eligible_at,
            box_body(|| ()),
            Arc::new(TaskSlot::new()),
        )
    }
}
