/*!
 * Monitoring
 * Tracing subscriber setup and lock-hold spans
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing, HoldSpan};
