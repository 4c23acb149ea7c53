/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for lock holder operations
pub type LockResult<T> = Result<T, OwnershipError>;

/// Result type for worker pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Lock ownership contract violations
///
/// These are programmer errors: the holder was asked to do something its
/// current state does not allow. They are never produced by contention.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum OwnershipError {
    #[error("{operation}: lock is not held by this holder")]
    #[diagnostic(
        code(ownership::not_locked),
        help("Call lock() or try_lock() before using the holder, or keep it locked.")
    )]
    NotLocked { operation: String },

    #[error("{operation}: lock is already held by this holder")]
    #[diagnostic(
        code(ownership::already_locked),
        help("A holder cannot lock twice. Call unlock() first.")
    )]
    AlreadyLocked { operation: String },
}

impl OwnershipError {
    #[inline]
    pub(crate) fn not_locked(operation: &str) -> Self {
        Self::NotLocked {
            operation: operation.to_string(),
        }
    }

    #[inline]
    pub(crate) fn already_locked(operation: &str) -> Self {
        Self::AlreadyLocked {
            operation: operation.to_string(),
        }
    }
}

/// Worker pool errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PoolError {
    #[error("Thread pool has been shut down")]
    #[diagnostic(
        code(pool::shut_down),
        help("Tasks cannot be submitted after shutdown(). Create a new pool.")
    )]
    ShutDown,

    #[error("Invalid pool size: {0}")]
    #[diagnostic(code(pool::invalid_size), help("A pool needs at least one worker."))]
    InvalidSize(usize),

    #[error("Failed to spawn worker thread: {0}")]
    #[diagnostic(
        code(pool::spawn_failed),
        help("The OS refused to create a thread. Check thread limits and stack size.")
    )]
    SpawnFailed(String),
}

/// Outcome errors for waitable tasks
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TaskError {
    #[error("Task panicked: {0}")]
    #[diagnostic(code(task::panicked))]
    Panicked(String),

    #[error("Task was dropped before it ran")]
    #[diagnostic(
        code(task::cancelled),
        help("The pool shut down while the task was still queued.")
    )]
    Cancelled,

    #[error("Timed out waiting for task result")]
    #[diagnostic(code(task::timeout))]
    Timeout,
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
