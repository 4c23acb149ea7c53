/*!
 * Synchronization Primitives
 *
 * Event primitives with auto-reset and manual-reset semantics:
 * - Condvar-backed [`Signal`] for waiters that hold a resource lock
 * - Semaphore-backed [`SemaphoreSignal`] for lock-free waiters
 * - [`MultiSignal`] carrying "which event fired"
 *
 * # Architecture
 *
 * Both backends share [`SignalState`]: a flag plus version counters. A waiter
 * snapshots the versions on entry, so an event that fires before it parks is
 * observed instead of lost.
 */

mod condvar;
mod multi;
mod semaphore;
mod state;
mod traits;

pub use condvar::Signal;
pub use multi::MultiSignal;
pub use semaphore::{Semaphore, SemaphoreSignal};
pub use state::{ResetPolicy, SignalState, SignalVersions};
pub use traits::{SignalEvent, WaitLock};
