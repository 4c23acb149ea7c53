/*!
 * AI-OS Sync Library
 * Resource ownership, event signaling and a worker pool built on them
 */

pub mod core;
pub mod monitoring;
pub mod pool;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::guard::{
    init_tracking_from_env, ConcurrentLockHolder, DisabledTracking, EnabledTracking,
    ExclusiveLockHolder, ResourceOwner, RuntimeTracking,
};
pub use crate::core::sync::{MultiSignal, ResetPolicy, SemaphoreSignal, Signal, SignalEvent};
pub use monitoring::{init_tracing, HoldSpan};
pub use pool::{PoolConfig, SyncThreadPool, TaskHandle};
