/*!
 * Monitoring
 * Structured logging setup for the scheduler
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing};
