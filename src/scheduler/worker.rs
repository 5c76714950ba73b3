/*!
 * Worker Loop
 *
 * Single background thread that pops the most urgent eligible task, runs it
 * outside the queue lock, and records statistics.
 *
 * States: WaitingForWork -> WaitingForEligibility -> Executing -> ... -> Stopped
 */

use super::handle::TaskStatus;
use super::queue::Poll;
use super::task::Task;
use super::types::{ShutdownMode, WorkerState};
use super::Shared;
use crate::core::errors::TaskFailure;
use parking_lot::MutexGuard;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, error, info, trace, warn};

pub(super) fn run(shared: Arc<Shared>, generation: u64) {
    let mut inner = shared.inner.lock();
    debug!(generation, "Worker loop started");

    loop {
        if !inner.running && shared.config.shutdown_mode == ShutdownMode::Abandon {
            break;
        }

        let now = shared.clock.now();
        match inner.store.poll(now) {
            Poll::Ready(task) => {
                inner.worker_state = WorkerState::Executing;
                MutexGuard::unlocked(&mut inner, || execute(&shared, task));
            }
            Poll::Pending(eligible_at) => {
                // Stop does not wait for delayed work to become eligible
                if !inner.running {
                    break;
                }
                inner.worker_state = WorkerState::WaitingForEligibility;
                let wait = eligible_at
                    .saturating_duration_since(now)
                    .min(shared.config.max_wait);
                trace!(
                    top = ?inner.store.peek().map(|t| t.id()),
                    wait_us = wait.as_micros() as u64,
                    "Waiting for top task to become eligible"
                );
                shared.work_ready.wait_for(&mut inner, wait);
            }
            Poll::Empty => {
                if !inner.running {
                    break;
                }
                inner.worker_state = WorkerState::WaitingForWork;
                shared.work_ready.wait(&mut inner);
            }
        }
    }

    let abandoned = if inner.store.is_empty() {
        Vec::new()
    } else {
        inner.store.drain()
    };
    inner.worker_state = WorkerState::Stopped;
    inner.worker_thread = None;
    inner.stopping = false;
    drop(inner);
    // Wakes a start() waiting on this worker
    shared.work_ready.notify_all();

    if !abandoned.is_empty() {
        info!(count = abandoned.len(), "Discarding pending tasks on stop");
        shared.stats.record_discarded(abandoned.len() as u64);
        for task in abandoned {
            task.slot().finish(TaskStatus::Discarded);
        }
    }
    debug!(generation, "Worker loop exited");
}

/// Run one task body on the worker thread, catching errors and panics
fn execute(shared: &Shared, task: Task) {
    let id = task.id();
    let priority = task.priority();
    let queued = shared.clock.now().saturating_duration_since(task.submitted_at());
    let (body, slot) = task.into_parts();

    let span = debug_span!("task", task_id = %id, priority);
    let _entered = span.enter();
    slot.mark_running();

    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(body))
        .unwrap_or_else(|payload| Err(TaskFailure::from_panic(payload)));
    let elapsed = started.elapsed();

    shared.stats.record_execution(outcome.is_ok(), elapsed);

    if elapsed > shared.config.slow_task_threshold {
        warn!(
            task_id = %id,
            duration_ms = elapsed.as_millis() as u64,
            slow = true,
            "slow task detected"
        );
    }

    match outcome {
        Ok(()) => {
            trace!(
                queued_us = queued.as_micros() as u64,
                duration_us = elapsed.as_micros() as u64,
                "Task completed"
            );
            slot.finish(TaskStatus::Completed);
        }
        Err(failure) => {
            error!(task_id = %id, priority, error = %failure, "Task failed");
            slot.finish(TaskStatus::Failed(failure));
        }
    }
}
