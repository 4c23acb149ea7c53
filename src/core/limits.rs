/*!
 * Limits and Constants
 *
 * Centralized location for defaults, thresholds and environment variable names.
 */

use std::time::Duration;

// =============================================================================
// WORKER POOL
// =============================================================================

/// Worker count used when available parallelism cannot be queried
pub const FALLBACK_POOL_WORKERS: usize = 4;

/// Prefix for worker thread names ("sync-worker-0", "sync-worker-1", ...)
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "sync-worker";

/// Environment override for the worker count
pub const ENV_POOL_WORKERS: &str = "SYNC_POOL_WORKERS";

/// Environment override for the worker thread name prefix
pub const ENV_POOL_THREAD_PREFIX: &str = "SYNC_POOL_THREAD_PREFIX";

// =============================================================================
// LOCK TRACKING
// =============================================================================

/// Enables runtime lock tracking when set to "1" or "true"
pub const ENV_LOCK_TRACKING: &str = "SYNC_LOCK_TRACKING";

/// Tracked locks held longer than this are reported on release
pub const LONG_HOLD_WARNING: Duration = Duration::from_millis(100);

// =============================================================================
// TRACING
// =============================================================================

/// Switches the subscriber to JSON output when set to "1" or "true"
pub const ENV_TRACE_JSON: &str = "SYNC_TRACE_JSON";

/// Parse a boolean-ish environment flag
pub(crate) fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
