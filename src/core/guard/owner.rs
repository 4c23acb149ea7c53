/*!
 * Resource Owner
 *
 * Holds a resource behind a raw lock and hands out RAII holders for it.
 * The resource is never reachable except through a holder, and holders
 * borrow the owner, so they cannot outlive it.
 */

use super::concurrent::ConcurrentLockHolder;
use super::exclusive::ExclusiveLockHolder;
use super::mutex::{MutexKind, PlainMutex, SharedMutex, SharedMutexKind};
use super::tracking::{
    DisabledTracking, HolderId, LockInformation, LockKind, LockRegistry, TrackingPolicy,
};
use std::any::type_name;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::ManuallyDrop;
use std::panic::Location;
use std::ptr;
use std::time::Duration;
use tracing::error;

/// Mutex-guarded resource with exclusive and concurrent accessors
///
/// # Type Parameters
///
/// - `T`: the guarded resource
/// - `P`: lock tracking policy ([`DisabledTracking`] by default)
/// - `M`: raw lock kind; [`SharedMutex`] (default) adds `concurrent()`
///
/// # Example
///
/// ```
/// use ai_os_sync::core::guard::ResourceOwner;
///
/// let owner: ResourceOwner<Vec<u32>> = ResourceOwner::new(Vec::new());
///
/// owner.exclusive().push(7);
///
/// let a = owner.concurrent();
/// let b = owner.concurrent();
/// assert_eq!(a.len() + b.len(), 2);
/// ```
pub struct ResourceOwner<T, P: TrackingPolicy = DisabledTracking, M: MutexKind = SharedMutex> {
    raw: M::Raw,
    registry: P::Registry,
    resource: UnsafeCell<T>,
}

// SAFETY: the raw lock serializes access; a plain mutex never hands out
// shared references on two threads at once, so `T: Send` suffices.
unsafe impl<T: Send, P: TrackingPolicy> Sync for ResourceOwner<T, P, PlainMutex> {}

// SAFETY: concurrent holders expose `&T` on several threads simultaneously.
unsafe impl<T: Send + Sync, P: TrackingPolicy> Sync for ResourceOwner<T, P, SharedMutex> {}

impl<T, P: TrackingPolicy, M: MutexKind> ResourceOwner<T, P, M> {
    pub fn new(resource: T) -> Self {
        Self {
            raw: M::INIT,
            registry: P::Registry::default(),
            resource: UnsafeCell::new(resource),
        }
    }

    /// Block until no other holder exists, then lock exclusively
    #[track_caller]
    pub fn exclusive(&self) -> ExclusiveLockHolder<'_, T, P, M> {
        M::lock_exclusive(&self.raw);
        ExclusiveLockHolder::locked(self, Location::caller())
    }

    /// Exclusive holder if the lock is free right now
    #[track_caller]
    pub fn try_exclusive(&self) -> Option<ExclusiveLockHolder<'_, T, P, M>> {
        let location = Location::caller();
        M::try_lock_exclusive(&self.raw).then(|| ExclusiveLockHolder::locked(self, location))
    }

    #[track_caller]
    pub fn try_exclusive_for(&self, timeout: Duration) -> Option<ExclusiveLockHolder<'_, T, P, M>> {
        let location = Location::caller();
        M::try_lock_exclusive_for(&self.raw, timeout)
            .then(|| ExclusiveLockHolder::locked(self, location))
    }

    /// Diagnostics of the live exclusive holder, when tracked
    pub fn exclusive_information(&self) -> Option<LockInformation> {
        self.registry.exclusive()
    }

    /// All live tracked holders, exclusive first
    pub fn lock_information(&self) -> Vec<LockInformation> {
        let mut entries: Vec<_> = self.registry.exclusive().into_iter().collect();
        entries.extend(self.registry.all_concurrent());
        entries
    }

    /// Direct access; `&mut self` proves no holder exists
    pub fn get_mut(&mut self) -> &mut T {
        self.resource.get_mut()
    }

    /// Block until every in-flight holder has released the lock
    pub fn drain(&self) {
        M::lock_exclusive(&self.raw);
        // SAFETY: locked on the line above
        unsafe { M::unlock_exclusive(&self.raw) };
    }

    /// Consume the owner and return the resource
    pub fn into_inner(self) -> T {
        let this = ManuallyDrop::new(self);
        this.check_drained();
        // SAFETY: `this` is never dropped, and each field is read exactly once
        unsafe {
            drop(ptr::read(&this.registry));
            ptr::read(&this.resource).into_inner()
        }
    }

    /// Non-blocking drain check used on teardown
    ///
    /// Only a leaked holder (`mem::forget`) can make this fail.
    fn check_drained(&self) -> bool {
        if M::try_lock_exclusive(&self.raw) {
            // SAFETY: locked on the line above
            unsafe { M::unlock_exclusive(&self.raw) };
            true
        } else {
            error!(
                resource = type_name::<T>(),
                mutex = M::NAME,
                "resource owner torn down while still locked (leaked holder?)"
            );
            false
        }
    }

    #[inline]
    pub(super) fn raw(&self) -> &M::Raw {
        &self.raw
    }

    /// # Safety
    ///
    /// Caller must hold the lock (shared or exclusive).
    #[inline]
    pub(super) unsafe fn resource(&self) -> &T {
        &*self.resource.get()
    }

    /// # Safety
    ///
    /// Caller must hold the exclusive lock.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(super) unsafe fn resource_mut(&self) -> &mut T {
        &mut *self.resource.get()
    }

    pub(super) fn track_exclusive(&self, location: &'static Location<'static>) {
        if P::should_track() {
            self.registry.push_exclusive(self.capture(LockKind::Exclusive, location));
        }
    }

    pub(super) fn untrack_exclusive(&self) {
        self.registry.pop_exclusive();
    }

    pub(super) fn track_concurrent(&self, id: HolderId, location: &'static Location<'static>) {
        if P::should_track() {
            self.registry
                .push_concurrent(id, self.capture(LockKind::Concurrent, location));
        }
    }

    pub(super) fn untrack_concurrent(&self, id: HolderId) {
        self.registry.pop_concurrent(id);
    }

    pub(super) fn concurrent_entry(&self, id: HolderId) -> Option<LockInformation> {
        self.registry.concurrent(id)
    }

    fn capture(&self, kind: LockKind, location: &'static Location<'static>) -> LockInformation {
        LockInformation::capture(kind, M::NAME, location, Some(type_name::<T>()))
    }
}

impl<T, P: TrackingPolicy, M: SharedMutexKind> ResourceOwner<T, P, M> {
    /// Block until no exclusive holder exists, then lock shared
    #[track_caller]
    pub fn concurrent(&self) -> ConcurrentLockHolder<'_, T, P, M> {
        M::lock_shared(&self.raw);
        ConcurrentLockHolder::locked(self, Location::caller())
    }

    #[track_caller]
    pub fn try_concurrent(&self) -> Option<ConcurrentLockHolder<'_, T, P, M>> {
        let location = Location::caller();
        M::try_lock_shared(&self.raw).then(|| ConcurrentLockHolder::locked(self, location))
    }

    #[track_caller]
    pub fn try_concurrent_for(&self, timeout: Duration) -> Option<ConcurrentLockHolder<'_, T, P, M>> {
        let location = Location::caller();
        M::try_lock_shared_for(&self.raw, timeout)
            .then(|| ConcurrentLockHolder::locked(self, location))
    }

    /// Diagnostics of all live concurrent holders, oldest first
    pub fn concurrent_information(&self) -> Vec<LockInformation> {
        self.registry.all_concurrent()
    }
}

impl<T: Default, P: TrackingPolicy, M: MutexKind> Default for ResourceOwner<T, P, M> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> From<T> for ResourceOwner<T, P, M> {
    fn from(resource: T) -> Self {
        Self::new(resource)
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> Drop for ResourceOwner<T, P, M> {
    fn drop(&mut self) {
        self.check_drained();
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> fmt::Debug for ResourceOwner<T, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceOwner")
            .field("resource", &type_name::<T>())
            .field("mutex", &M::NAME)
            .finish_non_exhaustive()
    }
}
