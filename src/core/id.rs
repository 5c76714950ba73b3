/*!
 * ID Generation System
 * Type-safe task identifiers backed by a lock-free counter
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Task ID, unique per scheduler instance and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly increasing task ID counter
///
/// # Performance
/// - Cache-line aligned to prevent false sharing between submitters
/// - Lock-free atomic increment
#[repr(C, align(64))]
#[derive(Debug)]
pub struct TaskIdGenerator {
    counter: AtomicU64,
}

impl TaskIdGenerator {
    /// Create new generator starting at 0
    #[inline]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create new generator starting at given value
    #[inline]
    pub const fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    /// Hand out the next ID
    #[inline]
    pub fn generate_task_id(&self) -> TaskId {
        TaskId(self.counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Next value to be handed out (for diagnostics)
    #[inline]
    pub fn peek(&self) -> TaskId {
        TaskId(self.counter.load(Ordering::Relaxed))
    }
}

impl Default for TaskIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
