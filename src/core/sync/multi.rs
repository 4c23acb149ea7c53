/*!
 * Multi-Valued Signal
 *
 * "Wait until told which of several named conditions occurred" without one
 * primitive per condition. The payload is written before the inner signal
 * fires, so a woken waiter always reads the value that woke it or a newer one.
 */

use super::semaphore::SemaphoreSignal;
use super::state::ResetPolicy;
use super::traits::SignalEvent;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Signal that carries an event value
///
/// # Example
///
/// ```
/// use ai_os_sync::core::sync::{MultiSignal, SignalEvent};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// enum Door { Opened, Closed }
///
/// impl SignalEvent for Door {
///     fn to_raw(self) -> u32 { self as u32 }
///     fn from_raw(raw: u32) -> Self { if raw == 0 { Door::Opened } else { Door::Closed } }
/// }
///
/// let signal = MultiSignal::<Door>::new();
/// signal.signalize(Door::Closed);
/// assert_eq!(signal.wait(), Door::Closed);
/// ```
#[derive(Debug)]
pub struct MultiSignal<E: SignalEvent> {
    signal: SemaphoreSignal,
    payload: AtomicU32,
    written: AtomicBool,
    _event: PhantomData<E>,
}

impl<E: SignalEvent> MultiSignal<E> {
    /// Auto-reset multi-signal: one waiter per wake-up, unobserved signals collapse
    pub const fn new() -> Self {
        Self::with_policy(ResetPolicy::Auto)
    }

    pub const fn with_policy(policy: ResetPolicy) -> Self {
        Self {
            signal: SemaphoreSignal::new(policy),
            payload: AtomicU32::new(0),
            written: AtomicBool::new(false),
            _event: PhantomData,
        }
    }

    /// Store `event` and fire the inner signal
    pub fn signalize(&self, event: E) {
        self.payload.store(event.to_raw(), Ordering::Release);
        self.written.store(true, Ordering::Release);
        self.signal.signalize();
    }

    /// Block until signaled, returning the stored event
    pub fn wait(&self) -> E {
        self.signal.wait();
        self.load()
    }

    /// `None` on timeout
    pub fn wait_for(&self, timeout: Duration) -> Option<E> {
        self.signal.wait_for(timeout).then(|| self.load())
    }

    pub fn wait_until(&self, deadline: Instant) -> Option<E> {
        self.signal.wait_until(deadline).then(|| self.load())
    }

    /// Most recently signalized event, if any
    pub fn last_event(&self) -> Option<E> {
        self.written.load(Ordering::Acquire).then(|| self.load())
    }

    pub fn reset(&self) {
        self.signal.reset();
    }

    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.signal.is_signaled()
    }

    #[inline]
    fn load(&self) -> E {
        E::from_raw(self.payload.load(Ordering::Acquire))
    }
}

impl<E: SignalEvent> Default for MultiSignal<E> {
    fn default() -> Self {
        Self::new()
    }
}
