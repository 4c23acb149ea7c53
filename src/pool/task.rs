/*!
 * Pool Tasks
 *
 * Type-erased work items and the handle returned for waitable tasks.
 */

use crate::core::errors::{panic_message, TaskError};
use crate::core::sync::SignalEvent;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Events the pool's workers wait on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolEvent {
    /// A task was queued
    Ready,
    /// A worker should terminate
    Exit,
}

impl SignalEvent for PoolEvent {
    #[inline]
    fn to_raw(self) -> u32 {
        match self {
            PoolEvent::Ready => 0,
            PoolEvent::Exit => 1,
        }
    }

    #[inline]
    fn from_raw(raw: u32) -> Self {
        match raw {
            0 => PoolEvent::Ready,
            _ => PoolEvent::Exit,
        }
    }
}

/// Zero-argument job queued on the pool
pub struct Task {
    job: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    pub fn new<F>(job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { job: Box::new(job) }
    }

    /// Wrap `job` so its result (or panic) is delivered to a [`TaskHandle`]
    pub fn waitable<F, R>(job: F) -> (Self, TaskHandle<R>)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = flume::bounded(1);
        let task = Self::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())));
            // Receiver gone means nobody is waiting, which is fine
            let _ = tx.send(outcome);
        });
        (task, TaskHandle { rx })
    }

    #[inline]
    pub(crate) fn run(self) {
        (self.job)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Result side of a waitable task
///
/// Dropping the handle does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle<R> {
    rx: flume::Receiver<Result<R, TaskError>>,
}

impl<R> TaskHandle<R> {
    /// Block until the task finishes
    pub fn wait(self) -> Result<R, TaskError> {
        self.rx.recv().unwrap_or(Err(TaskError::Cancelled))
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<R, TaskError> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(flume::RecvTimeoutError::Timeout) => Err(TaskError::Timeout),
            Err(flume::RecvTimeoutError::Disconnected) => Err(TaskError::Cancelled),
        }
    }

    /// Non-blocking poll; `None` while the task is still pending
    pub fn try_result(&self) -> Option<Result<R, TaskError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(TaskError::Cancelled)),
        }
    }

    /// Await the result from async code
    pub async fn wait_async(self) -> Result<R, TaskError> {
        self.rx.recv_async().await.unwrap_or(Err(TaskError::Cancelled))
    }

    pub fn is_finished(&self) -> bool {
        !self.rx.is_empty() || self.rx.is_disconnected()
    }
}
