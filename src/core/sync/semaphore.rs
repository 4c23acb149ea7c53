/*!
 * Semaphore-Backed Signal
 *
 * Lock-free-for-the-caller variant of [`Signal`](super::Signal): waiters do
 * not hold any lock, they park on a counting semaphore instead.
 *
 * # Design
 *
 * - Auto-reset: the flag is binary, like the condvar backend. Only a raise
 *   that finds the flag clear deposits a permit, and a waiter only returns
 *   after winning the flag with `take()`. A permit whose flag was already taken
 *   is stale and discarded. A signal raised before anyone waits stays pending,
 *   so a late waiter still returns immediately.
 * - Manual-reset: a woken waiter that sees the signal hands the permit back,
 *   so the next parked waiter wakes too. `reset()` drains leftover permits.
 */

use super::state::{ResetPolicy, SignalState, SignalVersions};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Counting semaphore on parking_lot primitives
#[derive(Debug, Default)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub const fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Block until a permit is available and take it
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Take a permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    pub fn try_acquire_for(&self, timeout: Duration) -> bool {
        self.try_acquire_until(Instant::now() + timeout)
    }

    pub fn try_acquire_until(&self, deadline: Instant) -> bool {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            if self.available.wait_until(&mut permits, deadline).timed_out() {
                break;
            }
        }
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Add `count` permits, waking up to `count` waiters
    pub fn release(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut permits = self.permits.lock();
        *permits += count;
        if count == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
    }

    /// Remove all outstanding permits, returning how many there were
    pub fn drain(&self) -> usize {
        std::mem::take(&mut *self.permits.lock())
    }

    #[inline]
    pub fn available_permits(&self) -> usize {
        *self.permits.lock()
    }
}

/// Auto- or manual-reset event backed by a counting semaphore
#[derive(Debug)]
pub struct SemaphoreSignal {
    policy: ResetPolicy,
    state: SignalState,
    semaphore: Semaphore,
}

impl SemaphoreSignal {
    pub const fn new(policy: ResetPolicy) -> Self {
        Self {
            policy,
            state: SignalState::new(),
            semaphore: Semaphore::new(0),
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

    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.state.is_signaled()
    }

    #[inline]
    pub fn versions(&self) -> SignalVersions {
        self.state.versions()
    }

    /// Fire the event
    ///
    /// Auto-reset signals raised again before a waiter observes them collapse
    /// into one wake-up.
    pub fn signalize(&self) {
        match self.policy {
            ResetPolicy::Auto => {
                if self.state.raise_edge() {
                    self.semaphore.release(1);
                }
            }
            ResetPolicy::Manual => {
                self.state.raise();
                self.semaphore.release(1);
            }
        }
    }

    /// Clear the flag and discard pending permits
    pub fn reset(&self) {
        self.state.clear();
        self.semaphore.drain();
    }

    /// Block until signaled
    pub fn wait(&self) {
        self.wait_inner(None);
    }

    /// Returns `false` if `timeout` elapsed first
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.wait_inner(Some(Instant::now() + timeout))
    }

    pub fn wait_until(&self, deadline: Instant) -> bool {
        self.wait_inner(Some(deadline))
    }

    fn wait_inner(&self, deadline: Option<Instant>) -> bool {
        let entry = self.state.versions();

        loop {
            if self.observe(&entry) {
                return true;
            }

            let acquired = match deadline {
                Some(deadline) => self.semaphore.try_acquire_until(deadline),
                None => {
                    self.semaphore.acquire();
                    true
                }
            };

            if !acquired {
                return self.observe(&entry);
            }

            // Auto-reset loops back to `observe`; a permit whose flag another
            // waiter already took is stale.
            if self.policy == ResetPolicy::Manual && self.state.check(ResetPolicy::Manual, &entry) {
                // Pass the wake-up on to the next parked waiter
                self.semaphore.release(1);
                return true;
            }
        }
    }

    /// Non-blocking check. Auto-reset consumes the flag.
    #[inline]
    fn observe(&self, entry: &SignalVersions) -> bool {
        self.state.check(self.policy, entry)
    }
}

impl Default for SemaphoreSignal {
    fn default() -> Self {
        Self::auto_reset()
    }
}
