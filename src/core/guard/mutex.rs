/*!
 * Mutex Kinds
 *
 * Type-level selection of the raw lock behind a [`ResourceOwner`](super::ResourceOwner).
 * Both kinds are parking_lot raw locks, so holders can lock and unlock
 * manually without self-referential guards.
 */

use parking_lot::lock_api::{RawMutex as _, RawMutexTimed as _, RawRwLock as _, RawRwLockTimed as _};
use std::time::Duration;

/// Raw lock with exclusive access
///
/// # Safety
///
/// `unlock_exclusive` may only be called by the party that currently holds
/// the exclusive lock.
pub unsafe trait MutexKind: Send + Sync + 'static {
    type Raw: Send + Sync;

    const INIT: Self::Raw;

    /// Name recorded in lock diagnostics
    const NAME: &'static str;

    fn lock_exclusive(raw: &Self::Raw);

    fn try_lock_exclusive(raw: &Self::Raw) -> bool;

    fn try_lock_exclusive_for(raw: &Self::Raw, timeout: Duration) -> bool;

    /// # Safety
    ///
    /// The exclusive lock must be held by the caller.
    unsafe fn unlock_exclusive(raw: &Self::Raw);
}

/// Raw lock that additionally supports shared (reader) access
///
/// # Safety
///
/// Shared and exclusive access must be mutually exclusive.
pub unsafe trait SharedMutexKind: MutexKind {
    fn lock_shared(raw: &Self::Raw);

    fn try_lock_shared(raw: &Self::Raw) -> bool;

    fn try_lock_shared_for(raw: &Self::Raw, timeout: Duration) -> bool;

    /// # Safety
    ///
    /// A shared lock must be held by the caller.
    unsafe fn unlock_shared(raw: &Self::Raw);
}

/// Plain mutex: `exclusive()` only
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMutex;

/// Reader-writer mutex: `exclusive()` and `concurrent()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedMutex;

unsafe impl MutexKind for PlainMutex {
    type Raw = parking_lot::RawMutex;

    const INIT: Self::Raw = parking_lot::RawMutex::INIT;
    const NAME: &'static str = "mutex";

    #[inline]
    fn lock_exclusive(raw: &Self::Raw) {
        raw.lock();
    }

    #[inline]
    fn try_lock_exclusive(raw: &Self::Raw) -> bool {
        raw.try_lock()
    }

    #[inline]
    fn try_lock_exclusive_for(raw: &Self::Raw, timeout: Duration) -> bool {
        raw.try_lock_for(timeout)
    }

    #[inline]
    unsafe fn unlock_exclusive(raw: &Self::Raw) {
        raw.unlock();
    }
}

unsafe impl MutexKind for SharedMutex {
    type Raw = parking_lot::RawRwLock;

    const INIT: Self::Raw = parking_lot::RawRwLock::INIT;
    const NAME: &'static str = "shared_mutex";

    #[inline]
    fn lock_exclusive(raw: &Self::Raw) {
        raw.lock_exclusive();
    }

    #[inline]
    fn try_lock_exclusive(raw: &Self::Raw) -> bool {
        raw.try_lock_exclusive()
    }

    #[inline]
    fn try_lock_exclusive_for(raw: &Self::Raw, timeout: Duration) -> bool {
        raw.try_lock_exclusive_for(timeout)
    }

    #[inline]
    unsafe fn unlock_exclusive(raw: &Self::Raw) {
        raw.unlock_exclusive();
    }
}

unsafe impl SharedMutexKind for SharedMutex {
    #[inline]
    fn lock_shared(raw: &Self::Raw) {
        raw.lock_shared();
    }

    #[inline]
    fn try_lock_shared(raw: &Self::Raw) -> bool {
        raw.try_lock_shared()
    }

    #[inline]
    fn try_lock_shared_for(raw: &Self::Raw, timeout: Duration) -> bool {
        raw.try_lock_shared_for(timeout)
    }

    #[inline]
    unsafe fn unlock_shared(raw: &Self::Raw) {
        raw.unlock_shared();
    }
}
