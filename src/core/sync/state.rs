/*!
 * Versioned Signal State
 *
 * Shared by both signal backends. The flag alone cannot tell a waiter that an
 * event happened while it was between "checked" and "asleep", so every
 * transition also bumps a version the waiter compared against on entry.
 */

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Reset behaviour of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResetPolicy {
    /// Returns to unsignaled after one waiter observes it
    #[default]
    Auto,
    /// Stays signaled until `reset()`
    Manual,
}

/// Version counters captured when a wait begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalVersions {
    pub signal: u64,
    pub auto_reset: u64,
    pub manual_reset: u64,
}

/// Atomically updated flag plus version counters
#[derive(Debug, Default)]
pub struct SignalState {
    signalized: AtomicBool,
    signal_version: AtomicU64,
    auto_reset_version: AtomicU64,
    manual_reset_version: AtomicU64,
}

impl SignalState {
    pub const fn new() -> Self {
        Self {
            signalized: AtomicBool::new(false),
            signal_version: AtomicU64::new(0),
            auto_reset_version: AtomicU64::new(0),
            manual_reset_version: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn versions(&self) -> SignalVersions {
        SignalVersions {
            signal: self.signal_version.load(Ordering::Acquire),
            auto_reset: self.auto_reset_version.load(Ordering::Acquire),
            manual_reset: self.manual_reset_version.load(Ordering::Acquire),
        }
    }

    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.signalized.load(Ordering::Acquire)
    }

    /// Set the flag and bump the signal version
    #[inline]
    pub fn raise(&self) {
        self.signalized.store(true, Ordering::Release);
        self.signal_version.fetch_add(1, Ordering::AcqRel);
    }

    /// Broadcast in auto-reset mode: every current waiter observes the event
    #[inline]
    pub fn raise_all(&self) {
        self.raise();
        self.auto_reset_version.fetch_add(1, Ordering::AcqRel);
    }

    /// Clear the flag and bump the manual reset version
    #[inline]
    pub fn clear(&self) {
        self.signalized.store(false, Ordering::Release);
        self.manual_reset_version.fetch_add(1, Ordering::AcqRel);
    }

    /// Consume the flag. Exactly one caller sees `true` per raise.
    #[inline]
    pub fn take(&self) -> bool {
        self.signalized.swap(false, Ordering::AcqRel)
    }

    /// Like [`raise`](Self::raise), but reports whether the flag was clear
    ///
    /// Repeated raises before anyone observes the flag collapse into one.
    #[inline]
    pub fn raise_edge(&self) -> bool {
        let was_set = self.signalized.swap(true, Ordering::AcqRel);
        self.signal_version.fetch_add(1, Ordering::AcqRel);
        !was_set
    }

    /// Whether a waiter that entered at `entry` should consider itself signaled
    ///
    /// Auto-reset consumes the flag, or accepts a broadcast issued since entry.
    /// Manual-reset never mutates; a raise since entry counts even if a
    /// `reset()` already cleared the flag again.
    #[inline]
    pub fn check(&self, policy: ResetPolicy, entry: &SignalVersions) -> bool {
        match policy {
            ResetPolicy::Auto => {
                self.take() || self.auto_reset_version.load(Ordering::Acquire) != entry.auto_reset
            }
            ResetPolicy::Manual => {
                self.is_signaled() || self.signal_version.load(Ordering::Acquire) != entry.signal
            }
        }
    }
}
