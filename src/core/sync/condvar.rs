/*!
 * Condvar-Backed Signal
 *
 * Event primitive on top of parking_lot::Condvar. Waiters hold a caller lock
 * (any [`WaitLock`]) which is released while parked and re-acquired before
 * returning, exactly like a condition variable.
 *
 * # Lost-Wakeup Freedom
 *
 * A waiter checks the versioned state while holding the internal gate mutex,
 * and `signalize*` bumps the state before taking that same gate to notify.
 * Either the waiter sees the new state, or it is already parked when the
 * notification arrives. The predicate is evaluated under the caller lock
 * only, so it may itself signal this `Signal`.
 *
 * Lock order is always caller lock, then gate. After waking the gate is
 * dropped before the caller lock is re-acquired.
 */

use super::state::{ResetPolicy, SignalState, SignalVersions};
use super::traits::WaitLock;
use crate::core::errors::{LockResult, OwnershipError};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Auto- or manual-reset event backed by a condition variable
///
/// # Example
///
/// ```
/// use ai_os_sync::core::guard::ResourceOwner;
/// use ai_os_sync::core::sync::Signal;
///
/// let owner: ResourceOwner<u32> = ResourceOwner::new(0);
/// let signal = Signal::auto_reset();
///
/// signal.signalize();
///
/// let mut holder = owner.exclusive();
/// // Already signaled, returns immediately
/// signal.wait(&mut holder).unwrap();
/// ```
#[derive(Debug)]
pub struct Signal {
    policy: ResetPolicy,
    state: SignalState,
    gate: Mutex<()>,
    condvar: Condvar,
}

impl Signal {
    pub const fn new(policy: ResetPolicy) -> Self {
        Self {
            policy,
            state: SignalState::new(),
            gate: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    pub const fn auto_reset() -> Self {
        Self::new(ResetPolicy::Auto)
    }

    pub const fn manual_reset() -> Self {
        Self::new(ResetPolicy::Manual)
    }

    #[inline]
    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    /// Peek at the flag without consuming it
    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.state.is_signaled()
    }

    /// Current version counters (diagnostics)
    #[inline]
    pub fn versions(&self) -> SignalVersions {
        self.state.versions()
    }

    /// Fire the event
    ///
    /// Auto-reset wakes one waiter. Manual-reset wakes all of them, since
    /// every waiter is entitled to observe a manual signal.
    pub fn signalize(&self) {
        self.state.raise();
        let _gate = self.gate.lock();
        match self.policy {
            ResetPolicy::Auto => {
                self.condvar.notify_one();
            }
            ResetPolicy::Manual => {
                self.condvar.notify_all();
            }
        }
    }

    /// Fire the event and wake every current waiter
    ///
    /// In auto-reset mode all parked waiters return, not just the first one
    /// to win the flag.
    pub fn signalize_all(&self) {
        match self.policy {
            ResetPolicy::Auto => self.state.raise_all(),
            ResetPolicy::Manual => self.state.raise(),
        }
        let _gate = self.gate.lock();
        self.condvar.notify_all();
    }

    /// Clear the flag
    ///
    /// Manual-reset waiters are woken so they re-check and park again.
    pub fn reset(&self) {
        self.state.clear();
        if self.policy == ResetPolicy::Manual {
            let _gate = self.gate.lock();
            self.condvar.notify_all();
        }
    }

    /// Block until signaled
    pub fn wait<L: WaitLock>(&self, lock: &mut L) -> LockResult<()> {
        self.wait_inner(lock, None, |_| false).map(|_| ())
    }

    /// Block until signaled or `predicate` holds
    ///
    /// `predicate` runs with the caller lock held but not the internal gate,
    /// and should only read state protected by that lock.
    pub fn wait_with<L, F>(&self, lock: &mut L, predicate: F) -> LockResult<()>
    where
        L: WaitLock,
        F: FnMut(&L) -> bool,
    {
        self.wait_inner(lock, None, predicate).map(|_| ())
    }

    /// Block until signaled or `timeout` elapses
    ///
    /// Returns `Ok(false)` on timeout; the signal is left unconsumed.
    pub fn wait_for<L: WaitLock>(&self, lock: &mut L, timeout: Duration) -> LockResult<bool> {
        self.wait_until(lock, Instant::now() + timeout)
    }

    pub fn wait_for_with<L, F>(&self, lock: &mut L, timeout: Duration, predicate: F) -> LockResult<bool>
    where
        L: WaitLock,
        F: FnMut(&L) -> bool,
    {
        self.wait_inner(lock, Some(Instant::now() + timeout), predicate)
    }

    pub fn wait_until<L: WaitLock>(&self, lock: &mut L, deadline: Instant) -> LockResult<bool> {
        self.wait_inner(lock, Some(deadline), |_| false)
    }

    pub fn wait_until_with<L, F>(&self, lock: &mut L, deadline: Instant, predicate: F) -> LockResult<bool>
    where
        L: WaitLock,
        F: FnMut(&L) -> bool,
    {
        self.wait_inner(lock, Some(deadline), predicate)
    }

    fn wait_inner<L, F>(
        &self,
        lock: &mut L,
        deadline: Option<Instant>,
        mut predicate: F,
    ) -> LockResult<bool>
    where
        L: WaitLock,
        F: FnMut(&L) -> bool,
    {
        if !lock.owns_lock() {
            return Err(OwnershipError::not_locked("wait"));
        }

        let entry = self.state.versions();

        loop {
            // The predicate reads state guarded by the caller lock, which is
            // still held here, so it may run outside the gate.
            if predicate(&*lock) {
                return Ok(true);
            }

            let mut gate = self.gate.lock();
            if self.state.check(self.policy, &entry) {
                return Ok(true);
            }

            lock.release_for_wait();
            let timed_out = match deadline {
                Some(deadline) => self.condvar.wait_until(&mut gate, deadline).timed_out(),
                None => {
                    self.condvar.wait(&mut gate);
                    false
                }
            };
            drop(gate);
            lock.reacquire_after_wait();

            if timed_out {
                return Ok(predicate(&*lock) || self.state.check(self.policy, &entry));
            }
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::auto_reset()
    }
}
