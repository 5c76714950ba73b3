/*!
 * Core Module
 * Fundamental scheduler types, identifiers, time, and error handling
 */

pub mod clock;
pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use errors::*;
pub use id::{TaskId, TaskIdGenerator};
pub use types::*;
