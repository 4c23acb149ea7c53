/*!
 * Pool Workers
 *
 * State shared between the pool handle and its worker threads, and the
 * worker loop itself.
 */

use super::task::{PoolEvent, Task};
use crate::core::errors::panic_message;
use crate::core::guard::{DisabledTracking, PlainMutex, ResourceOwner};
use crate::core::sync::MultiSignal;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Receives the panic message of a fire-and-forget task
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// FIFO of pending tasks; a plain mutex since every access mutates or is
/// a one-off length read
pub(super) type TaskQueue = ResourceOwner<VecDeque<Task>, DisabledTracking, PlainMutex>;

pub(super) struct PoolShared {
    pub(super) queue: TaskQueue,
    pub(super) events: MultiSignal<PoolEvent>,
    pub(super) exiting: AtomicBool,
    pub(super) completed: AtomicU64,
    pub(super) panicked: AtomicU64,
    error_callback: Option<ErrorCallback>,
}

impl PoolShared {
    pub(super) fn new(error_callback: Option<ErrorCallback>) -> Self {
        Self {
            queue: ResourceOwner::new(VecDeque::new()),
            events: MultiSignal::new(),
            exiting: AtomicBool::new(false),
            completed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
            error_callback,
        }
    }

    /// Worker main loop
    ///
    /// `Ready` is auto-reset, so several enqueues may collapse into one
    /// wake-up. A woken worker therefore drains the queue before parking
    /// again, and wakes a peer whenever it leaves work behind.
    pub(super) fn run_worker(&self, index: usize) {
        debug!(worker = index, "worker started");

        loop {
            let event = self.events.wait();
            if event == PoolEvent::Exit || self.exiting.load(Ordering::Acquire) {
                // Exit signals collapse too; pass it on to the next worker
                self.events.signalize(PoolEvent::Exit);
                break;
            }

            while let Some(task) = self.next_task() {
                self.execute(task, index);
            }
        }

        debug!(worker = index, "worker exiting");
    }

    /// Pop the next task, or `None` if the queue is empty or the pool is exiting
    fn next_task(&self) -> Option<Task> {
        let (task, more) = {
            let mut queue = self.queue.exclusive();
            if self.exiting.load(Ordering::Acquire) {
                return None;
            }
            let task = queue.pop_front();
            (task, !queue.is_empty())
        };

        if more {
            self.events.signalize(PoolEvent::Ready);
        }
        task
    }

    fn execute(&self, task: Task, index: usize) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run()));
        self.completed.fetch_add(1, Ordering::Relaxed);

        if let Err(payload) = outcome {
            self.panicked.fetch_add(1, Ordering::Relaxed);
            let message = panic_message(payload.as_ref());
            error!(worker = index, panic = %message, "pool task panicked");
            self.report(&message);
        }
    }

    fn report(&self, message: &str) {
        if let Some(callback) = &self.error_callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(message))).is_err() {
                warn!("pool error callback panicked, ignoring");
            }
        }
    }
}
