/*!
 * Core Types
 * Common types used across the scheduler
 */

/// Task priority (signed, lower value is more urgent)
pub type Priority = i32;

/// Common result type for scheduler control operations
pub type SchedulerResult<T> = Result<T, super::errors::SchedulerError>;
