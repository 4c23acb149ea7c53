/*!
 * Worker Pool
 *
 * Fixed-size pool of OS threads built on the crate's own primitives: the
 * task queue is a [`ResourceOwner`](crate::core::guard::ResourceOwner) and
 * workers park on a [`MultiSignal`](crate::core::sync::MultiSignal).
 *
 * ## Semantics
 *
 * - Every queued task runs exactly once unless the pool shuts down first
 * - A panicking task never takes its worker down; fire-and-forget panics go
 *   to the pool's error callback, waitable panics to the task's handle
 * - After [`SyncThreadPool::shutdown`] no task can be queued
 */

mod config;
mod task;
mod thread_pool;
mod worker;

pub use config::PoolConfig;
pub use task::{PoolEvent, Task, TaskHandle};
pub use thread_pool::SyncThreadPool;
pub use worker::ErrorCallback;
