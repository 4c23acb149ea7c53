/*!
 * Lock Tracking
 *
 * Optional diagnostics for lock acquisitions: who took which lock, where,
 * and when. The policy is a type parameter of the owner:
 *
 * - [`DisabledTracking`]: no registry is stored, nothing is recorded
 * - [`EnabledTracking`]: every acquisition is recorded
 * - [`RuntimeTracking`]: consults a process-wide toggle or predicate
 *
 * The logging callback, toggle and predicate are process-wide. They exist
 * for cross-cutting diagnostics only.
 */

use crate::core::limits::{env_flag, ENV_LOCK_TRACKING, LONG_HOLD_WARNING};
use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant, SystemTime};
use tracing::{trace, warn};

/// Callback invoked for each tracked acquisition
pub type LoggingCallback = Arc<dyn Fn(&LockInformation) + Send + Sync>;

/// Custom runtime predicate deciding whether to track
pub type TrackingPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

static LOGGING_CALLBACK: RwLock<Option<LoggingCallback>> = RwLock::new(None);
static TRACKING_PREDICATE: RwLock<Option<TrackingPredicate>> = RwLock::new(None);
static TRACKING_ENABLED: AtomicBool = AtomicBool::new(false);
static NEXT_HOLDER_ID: AtomicU64 = AtomicU64::new(1);

/// Access mode of a tracked acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockKind {
    Exclusive,
    Concurrent,
}

/// Process-unique identity of a lock holder
///
/// Survives moves, unlike the holder's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HolderId(u64);

impl HolderId {
    pub(crate) fn next() -> Self {
        Self(NEXT_HOLDER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Diagnostic snapshot taken when a lock is acquired
#[derive(Debug, Clone)]
pub struct LockInformation {
    pub kind: LockKind,
    pub mutex_type: &'static str,
    pub location: &'static Location<'static>,
    pub thread_id: ThreadId,
    pub thread_name: Option<String>,
    pub timestamp: SystemTime,
    pub acquired_at: Instant,
    pub resource_type: Option<&'static str>,
}

impl LockInformation {
    pub(crate) fn capture(
        kind: LockKind,
        mutex_type: &'static str,
        location: &'static Location<'static>,
        resource_type: Option<&'static str>,
    ) -> Self {
        let current = thread::current();
        Self {
            kind,
            mutex_type,
            location,
            thread_id: current.id(),
            thread_name: current.name().map(str::to_string),
            timestamp: SystemTime::now(),
            acquired_at: Instant::now(),
            resource_type,
        }
    }

    /// How long the lock has been held so far
    #[inline]
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

/// Storage for live lock diagnostics
///
/// Implemented by [`NoRegistry`] (zero-sized, records nothing) and
/// [`TrackedRegistry`].
pub trait LockRegistry: Default + Send + Sync + 'static {
    fn push_exclusive(&self, info: LockInformation);
    fn pop_exclusive(&self);
    fn push_concurrent(&self, id: HolderId, info: LockInformation);
    fn pop_concurrent(&self, id: HolderId);
    fn exclusive(&self) -> Option<LockInformation>;
    fn concurrent(&self, id: HolderId) -> Option<LockInformation>;
    fn all_concurrent(&self) -> Vec<LockInformation>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoRegistry;

impl LockRegistry for NoRegistry {
    #[inline(always)]
    fn push_exclusive(&self, _info: LockInformation) {}
    #[inline(always)]
    fn pop_exclusive(&self) {}
    #[inline(always)]
    fn push_concurrent(&self, _id: HolderId, _info: LockInformation) {}
    #[inline(always)]
    fn pop_concurrent(&self, _id: HolderId) {}
    #[inline(always)]
    fn exclusive(&self) -> Option<LockInformation> {
        None
    }
    #[inline(always)]
    fn concurrent(&self, _id: HolderId) -> Option<LockInformation> {
        None
    }
    #[inline(always)]
    fn all_concurrent(&self) -> Vec<LockInformation> {
        Vec::new()
    }
}

/// Registry guarded by its own mutexes, never the resource's
#[derive(Debug, Default)]
pub struct TrackedRegistry {
    exclusive: Mutex<Option<LockInformation>>,
    concurrent: Mutex<AHashMap<HolderId, LockInformation>>,
}

impl LockRegistry for TrackedRegistry {
    fn push_exclusive(&self, info: LockInformation) {
        notify(&info);
        *self.exclusive.lock() = Some(info);
    }

    fn pop_exclusive(&self) {
        if let Some(info) = self.exclusive.lock().take() {
            report_release(&info);
        }
    }

    fn push_concurrent(&self, id: HolderId, info: LockInformation) {
        notify(&info);
        self.concurrent.lock().insert(id, info);
    }

    fn pop_concurrent(&self, id: HolderId) {
        if let Some(info) = self.concurrent.lock().remove(&id) {
            report_release(&info);
        }
    }

    fn exclusive(&self) -> Option<LockInformation> {
        self.exclusive.lock().clone()
    }

    fn concurrent(&self, id: HolderId) -> Option<LockInformation> {
        self.concurrent.lock().get(&id).cloned()
    }

    fn all_concurrent(&self) -> Vec<LockInformation> {
        let mut entries: Vec<_> = self.concurrent.lock().values().cloned().collect();
        entries.sort_by_key(|info| info.acquired_at);
        entries
    }
}

/// Decides whether an acquisition records diagnostics
pub trait TrackingPolicy: Send + Sync + 'static {
    type Registry: LockRegistry;

    fn should_track() -> bool;
}

/// Never tracks; the owner stores a zero-sized registry
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTracking;

/// Always tracks and invokes the logging callback
#[derive(Debug, Clone, Copy, Default)]
pub struct EnabledTracking;

/// Tracks while the process-wide toggle (or custom predicate) says so
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeTracking;

impl TrackingPolicy for DisabledTracking {
    type Registry = NoRegistry;

    #[inline(always)]
    fn should_track() -> bool {
        false
    }
}

impl TrackingPolicy for EnabledTracking {
    type Registry = TrackedRegistry;

    #[inline(always)]
    fn should_track() -> bool {
        true
    }
}

impl TrackingPolicy for RuntimeTracking {
    type Registry = TrackedRegistry;

    #[inline]
    fn should_track() -> bool {
        let predicate = TRACKING_PREDICATE.read().clone();
        if let Some(predicate) = predicate {
            // Runs while the raw lock is held but before a holder owns it,
            // so a panic here must not unwind past the caller
            return panic::catch_unwind(AssertUnwindSafe(|| predicate())).unwrap_or_else(|_| {
                warn!("lock tracking predicate panicked, not tracking");
                false
            });
        }
        TRACKING_ENABLED.load(Ordering::Acquire)
    }
}

impl RuntimeTracking {
    pub fn enable_tracking() {
        enable_tracking();
    }

    pub fn disable_tracking() {
        disable_tracking();
    }
}

/// Turn on tracking for owners using [`RuntimeTracking`]
pub fn enable_tracking() {
    TRACKING_ENABLED.store(true, Ordering::Release);
}

pub fn disable_tracking() {
    TRACKING_ENABLED.store(false, Ordering::Release);
}

/// Current value of the runtime toggle (ignores any custom predicate)
pub fn is_tracking_enabled() -> bool {
    TRACKING_ENABLED.load(Ordering::Acquire)
}

/// Replace the runtime toggle with a custom predicate
pub fn set_tracking_predicate<F>(predicate: F)
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    *TRACKING_PREDICATE.write() = Some(Arc::new(predicate));
}

pub fn clear_tracking_predicate() {
    *TRACKING_PREDICATE.write() = None;
}

/// Enable runtime tracking if `SYNC_LOCK_TRACKING` is set
pub fn init_tracking_from_env() -> bool {
    let enabled = env_flag(ENV_LOCK_TRACKING);
    if enabled {
        enable_tracking();
    }
    enabled
}

/// Install the callback invoked for every tracked acquisition
pub fn set_logging_callback<F>(callback: F)
where
    F: Fn(&LockInformation) + Send + Sync + 'static,
{
    *LOGGING_CALLBACK.write() = Some(Arc::new(callback));
}

pub fn clear_logging_callback() {
    *LOGGING_CALLBACK.write() = None;
}

fn notify(info: &LockInformation) {
    trace!(
        kind = ?info.kind,
        mutex = info.mutex_type,
        resource = info.resource_type.unwrap_or("unknown"),
        location = %info.location,
        thread = ?info.thread_id,
        "lock acquired"
    );

    // Clone out so the callback runs without the registry lock held
    let callback = LOGGING_CALLBACK.read().clone();
    if let Some(callback) = callback {
        if panic::catch_unwind(AssertUnwindSafe(|| callback(info))).is_err() {
            warn!(location = %info.location, "lock logging callback panicked, ignoring");
        }
    }
}

fn report_release(info: &LockInformation) {
    let held = info.held_for();
    if held > LONG_HOLD_WARNING {
        warn!(
            kind = ?info.kind,
            resource = info.resource_type.unwrap_or("unknown"),
            location = %info.location,
            held_ms = held.as_millis() as u64,
            "lock held for a long time"
        );
    }
}
