/*!
 * Exclusive Lock Holder
 *
 * Single-owner RAII token. Locked from construction until `unlock()` or
 * drop; may be re-locked manually. Moving a holder moves its lock and its
 * diagnostic entry with it.
 */

use super::mutex::{MutexKind, SharedMutex};
use super::owner::ResourceOwner;
use super::tracking::{DisabledTracking, LockInformation, LockKind, TrackingPolicy};
use super::traits::Guard;
use crate::core::errors::{LockResult, OwnershipError};
use crate::core::sync::{Signal, WaitLock};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::time::{Duration, Instant};

/// Exclusive access to a [`ResourceOwner`]'s resource
///
/// # States
///
/// - Locked: `owns_lock()` is true, the resource is reachable
/// - Unlocked: after `unlock()`; `lock()`/`try_lock()` return to Locked
///
/// Locking twice or unlocking twice is an [`OwnershipError`].
pub struct ExclusiveLockHolder<'a, T, P: TrackingPolicy = DisabledTracking, M: MutexKind = SharedMutex> {
    owner: &'a ResourceOwner<T, P, M>,
    owns: bool,
    location: &'static Location<'static>,
    _resource: PhantomData<&'a mut T>,
}

impl<'a, T, P: TrackingPolicy, M: MutexKind> ExclusiveLockHolder<'a, T, P, M> {
    /// Wrap a raw lock the caller already acquired
    pub(super) fn locked(owner: &'a ResourceOwner<T, P, M>, location: &'static Location<'static>) -> Self {
        owner.track_exclusive(location);
        Self {
            owner,
            owns: true,
            location,
            _resource: PhantomData,
        }
    }

    #[inline]
    pub fn owns_lock(&self) -> bool {
        self.owns
    }

    /// The owner this holder locks
    #[inline]
    pub fn owner(&self) -> &'a ResourceOwner<T, P, M> {
        self.owner
    }

    /// Call site of the most recent acquisition
    #[inline]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Re-acquire after `unlock()`, blocking
    #[track_caller]
    pub fn lock(&mut self) -> LockResult<()> {
        if self.owns {
            return Err(OwnershipError::already_locked("lock"));
        }
        M::lock_exclusive(self.owner.raw());
        self.mark_locked(Location::caller());
        Ok(())
    }

    /// Re-acquire without blocking; `Ok(false)` if contended
    #[track_caller]
    pub fn try_lock(&mut self) -> LockResult<bool> {
        if self.owns {
            return Err(OwnershipError::already_locked("try_lock"));
        }
        if !M::try_lock_exclusive(self.owner.raw()) {
            return Ok(false);
        }
        self.mark_locked(Location::caller());
        Ok(true)
    }

    #[track_caller]
    pub fn try_lock_for(&mut self, timeout: Duration) -> LockResult<bool> {
        if self.owns {
            return Err(OwnershipError::already_locked("try_lock_for"));
        }
        let location = Location::caller();
        if !M::try_lock_exclusive_for(self.owner.raw(), timeout) {
            return Ok(false);
        }
        self.mark_locked(location);
        Ok(true)
    }

    pub fn unlock(&mut self) -> LockResult<()> {
        if !self.owns {
            return Err(OwnershipError::not_locked("unlock"));
        }
        self.release_raw();
        Ok(())
    }

    pub fn get(&self) -> LockResult<&T> {
        if !self.owns {
            return Err(OwnershipError::not_locked("get"));
        }
        // SAFETY: exclusive lock held
        Ok(unsafe { self.owner.resource() })
    }

    pub fn get_mut(&mut self) -> LockResult<&mut T> {
        if !self.owns {
            return Err(OwnershipError::not_locked("get_mut"));
        }
        // SAFETY: exclusive lock held, and `&mut self` prevents aliasing
        Ok(unsafe { self.owner.resource_mut() })
    }

    /// This holder's diagnostic entry, if tracked and locked
    pub fn information(&self) -> Option<LockInformation> {
        if self.owns {
            self.owner.exclusive_information()
        } else {
            None
        }
    }

    /// Wait on `signal`, releasing the lock while parked
    pub fn wait(&mut self, signal: &Signal) -> LockResult<()> {
        signal.wait(self)
    }

    /// Wait until signaled or `predicate(resource)` holds
    pub fn wait_with<F>(&mut self, signal: &Signal, mut predicate: F) -> LockResult<()>
    where
        F: FnMut(&T) -> bool,
    {
        signal.wait_with(self, |holder| predicate(holder.resource()))
    }

    pub fn wait_for(&mut self, signal: &Signal, timeout: Duration) -> LockResult<bool> {
        signal.wait_for(self, timeout)
    }

    pub fn wait_for_with<F>(&mut self, signal: &Signal, timeout: Duration, mut predicate: F) -> LockResult<bool>
    where
        F: FnMut(&T) -> bool,
    {
        signal.wait_for_with(self, timeout, |holder| predicate(holder.resource()))
    }

    pub fn wait_until(&mut self, signal: &Signal, deadline: Instant) -> LockResult<bool> {
        signal.wait_until(self, deadline)
    }

    pub fn wait_until_with<F>(&mut self, signal: &Signal, deadline: Instant, mut predicate: F) -> LockResult<bool>
    where
        F: FnMut(&T) -> bool,
    {
        signal.wait_until_with(self, deadline, |holder| predicate(holder.resource()))
    }

    /// Only called from signal predicates, which run while locked
    #[inline]
    fn resource(&self) -> &T {
        // SAFETY: signals invoke predicates only while the lock is held
        unsafe { self.owner.resource() }
    }

    fn mark_locked(&mut self, location: &'static Location<'static>) {
        self.owns = true;
        self.location = location;
        self.owner.track_exclusive(location);
    }

    fn release_raw(&mut self) {
        self.owner.untrack_exclusive();
        self.owns = false;
        // SAFETY: `owns` was true, so this holder has the exclusive lock
        unsafe { M::unlock_exclusive(self.owner.raw()) };
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> WaitLock for ExclusiveLockHolder<'_, T, P, M> {
    #[inline]
    fn owns_lock(&self) -> bool {
        self.owns
    }

    fn release_for_wait(&mut self) {
        self.release_raw();
    }

    fn reacquire_after_wait(&mut self) {
        M::lock_exclusive(self.owner.raw());
        self.mark_locked(self.location);
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> Guard for ExclusiveLockHolder<'_, T, P, M> {
    fn resource_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn lock_kind(&self) -> LockKind {
        LockKind::Exclusive
    }

    fn is_active(&self) -> bool {
        self.owns
    }

    fn release(&mut self) -> LockResult<()> {
        self.unlock()
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> Deref for ExclusiveLockHolder<'_, T, P, M> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Ok(resource) => resource,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> DerefMut for ExclusiveLockHolder<'_, T, P, M> {
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Ok(resource) => resource,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T, P: TrackingPolicy, M: MutexKind> Drop for ExclusiveLockHolder<'_, T, P, M> {
    fn drop(&mut self) {
        if self.owns {
            self.release_raw();
        }
    }
}

impl<T: fmt::Debug, P: TrackingPolicy, M: MutexKind> fmt::Debug for ExclusiveLockHolder<'_, T, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ExclusiveLockHolder");
        s.field("owns_lock", &self.owns);
        if let Ok(resource) = self.get() {
            s.field("resource", resource);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::guard::{EnabledTracking, PlainMutex};

    #[test]
    fn test_lock_unlock_cycle() {
        let owner: ResourceOwner<u32> = ResourceOwner::new(0);
        let mut holder = owner.exclusive();
        assert!(holder.owns_lock());

        *holder += 1;
        holder.unlock().unwrap();
        assert!(!holder.owns_lock());
        assert!(holder.get().is_err());

        holder.lock().unwrap();
        assert_eq!(*holder, 1);
    }

    #[test]
    fn test_double_lock_is_rejected() {
        let owner: ResourceOwner<u32> = ResourceOwner::new(0);
        let mut holder = owner.exclusive();

        assert!(matches!(holder.lock(), Err(OwnershipError::AlreadyLocked { .. })));
        assert!(matches!(holder.try_lock(), Err(OwnershipError::AlreadyLocked { .. })));

        holder.unlock().unwrap();
        assert!(matches!(holder.unlock(), Err(OwnershipError::NotLocked { .. })));
    }

    #[test]
    fn test_try_lock_contended() {
        let owner: ResourceOwner<u32, DisabledTracking, PlainMutex> = ResourceOwner::new(0);
        let mut first = owner.exclusive();
        first.unlock().unwrap();

        let second = owner.exclusive();
        assert!(!first.try_lock().unwrap());
        assert!(!first.try_lock_for(Duration::from_millis(10)).unwrap());

        drop(second);
        assert!(first.try_lock().unwrap());
    }

    #[test]
    #[should_panic(expected = "not held")]
    fn test_deref_unlocked_panics() {
        let owner: ResourceOwner<u32> = ResourceOwner::new(0);
        let mut holder = owner.exclusive();
        holder.unlock().unwrap();
        let _value = *holder;
    }

    #[test]
    fn test_move_transfers_tracking() {
        let owner: ResourceOwner<u32, EnabledTracking> = ResourceOwner::new(0);

        let holder = owner.exclusive();
        let line = holder.location().line();
        let moved = holder;

        let info = moved.information().unwrap();
        assert_eq!(info.location.line(), line);
        assert_eq!(info.kind, LockKind::Exclusive);

        drop(moved);
        assert!(owner.exclusive_information().is_none());
    }

    #[test]
    fn test_relock_records_new_location() {
        let owner: ResourceOwner<u32, EnabledTracking> = ResourceOwner::new(0);
        let mut holder = owner.exclusive();
        let first = holder.location().line();

        holder.unlock().unwrap();
        assert!(holder.information().is_none());

        holder.lock().unwrap();
        assert_ne!(holder.location().line(), first);
        assert_eq!(owner.exclusive_information().unwrap().location.line(), holder.location().line());
    }

    #[test]
    fn test_guard_trait() {
        let owner: ResourceOwner<String> = ResourceOwner::new(String::new());
        let mut holder = owner.exclusive();

        let guard: &mut dyn Guard = &mut holder;
        assert_eq!(guard.resource_type(), "alloc::string::String");
        assert_eq!(guard.lock_kind(), LockKind::Exclusive);
        assert!(guard.is_active());
        guard.release().unwrap();
        assert!(!guard.is_active());
        assert!(guard.release().is_err());
    }
}
