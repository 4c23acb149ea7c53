/*!
 * Core Module
 * Ownership guards, signaling primitives and error handling
 */

pub mod errors;
pub mod guard;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use guard::{
    ConcurrentLockHolder, DisabledTracking, EnabledTracking, ExclusiveLockHolder, Guard,
    LockInformation, LockKind, ResourceOwner, RuntimeTracking, TrackingPolicy,
};
pub use sync::{MultiSignal, ResetPolicy, Semaphore, SemaphoreSignal, Signal, SignalEvent};
