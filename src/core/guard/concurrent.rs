/*!
 * Concurrent Lock Holder
 *
 * Shared (reader) RAII token. Any number may coexist; each registers its
 * own diagnostic entry under its [`HolderId`].
 */

use super::mutex::{SharedMutex, SharedMutexKind};
use super::owner::ResourceOwner;
use super::tracking::{DisabledTracking, HolderId, LockInformation, LockKind, TrackingPolicy};
use super::traits::Guard;
use crate::core::errors::{LockResult, OwnershipError};
use crate::core::sync::{Signal, WaitLock};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::panic::Location;
use std::time::{Duration, Instant};

/// Read-only shared access to a [`ResourceOwner`]'s resource
pub struct ConcurrentLockHolder<'a, T, P: TrackingPolicy = DisabledTracking, M: SharedMutexKind = SharedMutex> {
    owner: &'a ResourceOwner<T, P, M>,
    id: HolderId,
    owns: bool,
    location: &'static Location<'static>,
    _resource: PhantomData<&'a T>,
}

impl<'a, T, P: TrackingPolicy, M: SharedMutexKind> ConcurrentLockHolder<'a, T, P, M> {
    pub(super) fn locked(owner: &'a ResourceOwner<T, P, M>, location: &'static Location<'static>) -> Self {
        let id = HolderId::next();
        owner.track_concurrent(id, location);
        Self {
            owner,
            id,
            owns: true,
            location,
            _resource: PhantomData,
        }
    }

    #[inline]
    pub fn owns_lock(&self) -> bool {
        self.owns
    }

    #[inline]
    pub fn id(&self) -> HolderId {
        self.id
    }

    #[inline]
    pub fn owner(&self) -> &'a ResourceOwner<T, P, M> {
        self.owner
    }

    #[inline]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    #[track_caller]
    pub fn lock(&mut self) -> LockResult<()> {
        if self.owns {
            return Err(OwnershipError::already_locked("lock"));
        }
        M::lock_shared(self.owner.raw());
        self.mark_locked(Location::caller());
        Ok(())
    }

    #[track_caller]
    pub fn try_lock(&mut self) -> LockResult<bool> {
        if self.owns {
            return Err(OwnershipError::already_locked("try_lock"));
        }
        if !M::try_lock_shared(self.owner.raw()) {
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
        if !M::try_lock_shared_for(self.owner.raw(), timeout) {
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
        // SAFETY: shared lock held
        Ok(unsafe { self.owner.resource() })
    }

    pub fn information(&self) -> Option<LockInformation> {
        if self.owns {
            self.owner.concurrent_entry(self.id)
        } else {
            None
        }
    }

    pub fn wait(&mut self, signal: &Signal) -> LockResult<()> {
        signal.wait(self)
    }

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

    #[inline]
    fn resource(&self) -> &T {
        // SAFETY: signals invoke predicates only while the lock is held
        unsafe { self.owner.resource() }
    }

    fn mark_locked(&mut self, location: &'static Location<'static>) {
        self.owns = true;
        self.location = location;
        self.owner.track_concurrent(self.id, location);
    }

    fn release_raw(&mut self) {
        self.owner.untrack_concurrent(self.id);
        self.owns = false;
        // SAFETY: `owns` was true, so this holder has a shared lock
        unsafe { M::unlock_shared(self.owner.raw()) };
    }
}

impl<T, P: TrackingPolicy, M: SharedMutexKind> WaitLock for ConcurrentLockHolder<'_, T, P, M> {
    #[inline]
    fn owns_lock(&self) -> bool {
        self.owns
    }

    fn release_for_wait(&mut self) {
        self.release_raw();
    }

    fn reacquire_after_wait(&mut self) {
        M::lock_shared(self.owner.raw());
        self.mark_locked(self.location);
    }
}

impl<T, P: TrackingPolicy, M: SharedMutexKind> Guard for ConcurrentLockHolder<'_, T, P, M> {
    fn resource_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn lock_kind(&self) -> LockKind {
        LockKind::Concurrent
    }

    fn is_active(&self) -> bool {
        self.owns
    }

    fn release(&mut self) -> LockResult<()> {
        self.unlock()
    }
}

impl<T, P: TrackingPolicy, M: SharedMutexKind> Deref for ConcurrentLockHolder<'_, T, P, M> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Ok(resource) => resource,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T, P: TrackingPolicy, M: SharedMutexKind> Drop for ConcurrentLockHolder<'_, T, P, M> {
    fn drop(&mut self) {
        if self.owns {
            self.release_raw();
        }
    }
}

impl<T: fmt::Debug, P: TrackingPolicy, M: SharedMutexKind> fmt::Debug for ConcurrentLockHolder<'_, T, P, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConcurrentLockHolder");
        s.field("id", &self.id).field("owns_lock", &self.owns);
        if let Ok(resource) = self.get() {
            s.field("resource", resource);
        }
        s.finish()
    }
}
