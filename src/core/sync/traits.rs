/*!
 * Synchronization Traits
 *
 * Seams between the signal primitives and the things that use them.
 */

/// A lock a condvar-backed [`Signal`](super::Signal) can release while blocked
///
/// The signal calls `release_for_wait` right before parking and
/// `reacquire_after_wait` after waking, so the caller always returns from a
/// wait holding the lock again. Both are only invoked while `owns_lock()`
/// is true.
pub trait WaitLock {
    /// Whether the lock is currently held
    fn owns_lock(&self) -> bool;

    /// Release the underlying lock before parking
    fn release_for_wait(&mut self);

    /// Re-acquire the underlying lock after waking
    fn reacquire_after_wait(&mut self);
}

/// Event payload carried by a [`MultiSignal`](super::MultiSignal)
///
/// Payloads are stored in an atomic, so they need a lossless `u32` encoding.
pub trait SignalEvent: Copy + Send + Sync + 'static {
    fn to_raw(self) -> u32;

    /// Decode a value previously produced by `to_raw`
    fn from_raw(raw: u32) -> Self;
}

impl SignalEvent for u32 {
    #[inline(always)]
    fn to_raw(self) -> u32 {
        self
    }

    #[inline(always)]
    fn from_raw(raw: u32) -> Self {
        raw
    }
}

impl SignalEvent for bool {
    #[inline(always)]
    fn to_raw(self) -> u32 {
        self as u32
    }

    #[inline(always)]
    fn from_raw(raw: u32) -> Self {
        raw != 0
    }
}
