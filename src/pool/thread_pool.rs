/*!
 * Synchronous Thread Pool
 *
 * Fixed set of OS threads pulling tasks from a lock-guarded FIFO. Workers
 * park on a [`MultiSignal`](crate::core::sync::MultiSignal) and are told
 * either `Ready` (work was queued) or `Exit`. Both are auto-reset, so bursts
 * collapse; workers drain the queue per wake-up and relay `Exit` to each
 * other.
 */

use super::config::PoolConfig;
use super::task::{PoolEvent, Task, TaskHandle};
use super::worker::{ErrorCallback, PoolShared};
use crate::core::errors::{PoolError, PoolResult};
use crate::core::guard::ResourceOwner;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Fixed-size worker pool
///
/// # Example
///
/// ```
/// use ai_os_sync::pool::SyncThreadPool;
///
/// let pool = SyncThreadPool::with_workers(2).unwrap();
/// let handle = pool.add_waitable_task(|| 2 + 2).unwrap();
/// assert_eq!(handle.wait(), Ok(4));
/// ```
pub struct SyncThreadPool {
    shared: Arc<PoolShared>,
    workers: ResourceOwner<Vec<JoinHandle<()>>>,
    pool_size: usize,
    config: PoolConfig,
}

impl SyncThreadPool {
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        Self::build(config, None)
    }

    pub fn with_workers(workers: usize) -> PoolResult<Self> {
        Self::new(PoolConfig::new(workers))
    }

    /// Pool whose fire-and-forget task panics are passed to `callback`
    pub fn with_error_callback<F>(config: PoolConfig, callback: F) -> PoolResult<Self>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self::build(config, Some(Arc::new(callback)))
    }

    fn build(config: PoolConfig, error_callback: Option<ErrorCallback>) -> PoolResult<Self> {
        if config.workers == 0 {
            return Err(PoolError::InvalidSize(0));
        }

        let pool = Self {
            shared: Arc::new(PoolShared::new(error_callback)),
            workers: ResourceOwner::new(Vec::with_capacity(config.workers)),
            pool_size: config.workers,
            config,
        };

        for index in 0..pool.pool_size {
            let shared = pool.shared.clone();
            let mut builder = thread::Builder::new().name(pool.config.thread_name(index));
            if let Some(stack_size) = pool.config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || shared.run_worker(index)) {
                Ok(handle) => pool.workers.exclusive().push(handle),
                Err(e) => {
                    // Dropping `pool` shuts down the workers spawned so far
                    return Err(PoolError::SpawnFailed(e.to_string()));
                }
            }
        }

        info!(
            workers = pool.pool_size,
            prefix = %pool.config.thread_name_prefix,
            "thread pool started"
        );
        Ok(pool)
    }

    /// Queue a fire-and-forget task
    pub fn add_task<F>(&self, job: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Task::new(job))
    }

    /// Queue a task and get a handle to its result
    pub fn add_waitable_task<F, R>(&self, job: F) -> PoolResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, handle) = Task::waitable(job);
        self.enqueue(task)?;
        Ok(handle)
    }

    fn enqueue(&self, task: Task) -> PoolResult<()> {
        {
            let mut queue = self.shared.queue.exclusive();
            if self.shared.exiting.load(Ordering::Acquire) {
                return Err(PoolError::ShutDown);
            }
            queue.push_back(task);
        }
        self.shared.events.signalize(PoolEvent::Ready);
        Ok(())
    }

    /// Number of queued (not yet started) tasks
    pub fn size(&self) -> usize {
        self.shared.queue.exclusive().len()
    }

    /// Number of workers the pool was created with
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Workers still running
    pub fn live_workers(&self) -> usize {
        self.workers
            .concurrent()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Tasks executed so far, including ones that panicked
    pub fn completed_tasks(&self) -> u64 {
        self.shared.completed.load(Ordering::Relaxed)
    }

    pub fn panicked_tasks(&self) -> u64 {
        self.shared.panicked.load(Ordering::Relaxed)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.exiting.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Stop all workers and wait for them
    ///
    /// Tasks a worker already dequeued finish first; tasks still queued are
    /// dropped and their handles report `Cancelled`. Idempotent.
    pub fn shutdown(&self) {
        {
            let _queue = self.shared.queue.exclusive();
            if self.shared.exiting.swap(true, Ordering::AcqRel) {
                return;
            }
        }

        // One signal is enough, each exiting worker relays it
        self.shared.events.signalize(PoolEvent::Exit);

        let handles = std::mem::take(&mut *self.workers.exclusive());

        for handle in handles {
            let name = handle.thread().name().map(str::to_string);
            if handle.join().is_err() {
                warn!(worker = ?name, "worker thread panicked outside a task");
            }
        }

        let dropped = std::mem::take(&mut *self.shared.queue.exclusive());
        debug!(
            dropped = dropped.len(),
            completed = self.completed_tasks(),
            "thread pool shut down"
        );
    }
}

impl Drop for SyncThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
