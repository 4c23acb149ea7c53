/*!
 * Structured Tracing
 * Subscriber setup for binaries and tests using the tracing crate
 */

use crate::core::limits::{env_flag, ENV_TRACE_JSON, LONG_HOLD_WARNING};
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYNC_TRACE_JSON: Enable JSON output (default: false)
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    if try_init_tracing() {
        info!(json = env_flag(ENV_TRACE_JSON), "structured tracing initialized");
    }
}

/// Install the global subscriber, returning `false` if one already exists
pub fn try_init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if env_flag(ENV_TRACE_JSON) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    }
}

/// Span covering a critical section
///
/// Logs the hold duration on drop and warns when it exceeds
/// [`LONG_HOLD_WARNING`].
pub struct HoldSpan {
    span: Span,
    start: Instant,
    name: &'static str,
}

impl HoldSpan {
    pub fn new(name: &'static str) -> Self {
        let span = span!(Level::DEBUG, "hold", name = name, duration_us = tracing::field::Empty);
        Self {
            span,
            start: Instant::now(),
            name,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for HoldSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.span.record("duration_us", elapsed.as_micros() as u64);

        let _entered = self.span.enter();
        if elapsed > LONG_HOLD_WARNING {
            warn!(name = self.name, duration_ms = elapsed.as_millis() as u64, "long critical section");
        } else {
            debug!(name = self.name, duration_us = elapsed.as_micros() as u64, "critical section done");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_span_measures() {
        let hold = HoldSpan::new("test");
        std::thread::sleep(Duration::from_millis(2));
        assert!(hold.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn test_second_init_is_noop() {
        try_init_tracing();
        assert!(!try_init_tracing());
    }
}
