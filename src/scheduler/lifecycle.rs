/*!
 * Scheduler Lifecycle
 * Worker thread creation, wake-up, and join
 */

use super::worker;
use super::{Scheduler, WorkerState};
use crate::core::errors::SchedulerError;
use crate::core::types::SchedulerResult;
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

impl Scheduler {
    /// Start the worker thread
    ///
    /// No-op if already running. Spawn failures are logged; use
    /// [`Scheduler::try_start`] to observe them.
    pub fn start(&self) {
        if let Err(e) = self.try_start() {
            error!(error = %e, "Failed to start task scheduler");
        }
    }

    /// Start the worker thread, reporting spawn failures
    pub fn try_start(&self) -> SchedulerResult<()> {
        if self.shared.on_worker_thread() {
            // The lifecycle lock may be held by a stop() that is joining this thread
            warn!("start() called from inside a task, ignoring");
            return Ok(());
        }

        let _lifecycle = self.lifecycle.lock();
        let mut inner = self.shared.inner.lock();
        if inner.running {
            return Ok(());
        }

        // A worker detached by stop() from inside a task still owns execution
        // until it exits; only one worker may run task bodies at a time
        while inner.worker_thread.is_some() {
            debug!("Waiting for detached worker to exit before starting");
            self.shared.work_ready.wait(&mut inner);
        }

        inner.running = true;
        inner.stopping = false;
        inner.generation += 1;
        inner.worker_state = WorkerState::WaitingForWork;
        let generation = inner.generation;

        // Spawned under the queue lock: the worker cannot observe state before
        // its thread id is recorded
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(self.shared.config.worker_name.clone())
            .spawn(move || worker::run(shared, generation));

        match spawned {
            Ok(handle) => {
                inner.worker_thread = Some(handle.thread().id());
                drop(inner);
                *self.worker.lock() = Some(handle);
                info!(generation, "Task scheduler started");
                Ok(())
            }
            Err(e) => {
                inner.running = false;
                inner.worker_state = WorkerState::Stopped;
                Err(SchedulerError::WorkerSpawn(e))
            }
        }
    }

    /// Stop the worker and wait for it to exit
    ///
    /// No-op if not running. Pending work is handled per
    /// [`ShutdownMode`](super::ShutdownMode); nothing runs after this returns.
    /// Called from inside a task, the worker is signalled but not joined; a
    /// later [`Scheduler::start`] waits for that worker to exit.
    pub fn stop(&self) {
        if self.shared.on_worker_thread() {
            if self.signal_stop() {
                warn!("stop() called from inside a task; worker exits after the current task");
                drop(self.worker.lock().take());
            }
            return;
        }

        let _lifecycle = self.lifecycle.lock();
        if !self.signal_stop() {
            return;
        }

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Task scheduler worker panicked");
            }
        }

        let stats = self.stats();
        info!(
            completed = stats.tasks_completed,
            failed = stats.tasks_failed,
            discarded = stats.tasks_discarded,
            "Task scheduler stopped"
        );
    }

    /// Flip the running flag and wake the worker; false if already stopped
    fn signal_stop(&self) -> bool {
        {
            let mut inner = self.shared.inner.lock();
            if !inner.running {
                return false;
            }
            inner.running = false;
            inner.stopping = true;
        }
        self.shared.work_ready.notify_all();
        true
    }

    /// True between start() and stop()
    pub fn is_running(&self) -> bool {
        self.shared.inner.lock().running
    }

    /// True while a stop is in progress
    pub fn is_stopping(&self) -> bool {
        self.shared.inner.lock().stopping
    }

    /// True while a joinable worker thread is attached
    pub fn has_worker(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// Current worker loop state
    pub fn worker_state(&self) -> WorkerState {
        self.shared.inner.lock().worker_state
    }
}
