/*!
 * RAII Resource Guards
 *
 * Mutex-guarded resource ownership with scoped access tokens.
 *
 * ## Design Principles
 *
 * 1. **Borrowed Tokens**: Holders borrow their owner and cannot outlive it
 * 2. **Explicit States**: Holders move between Locked and Unlocked; illegal
 *    transitions are `OwnershipError`s
 * 3. **Pluggable Diagnostics**: The tracking policy is a type parameter, so
 *    disabled tracking costs nothing
 * 4. **Signal Integration**: Holders are [`WaitLock`](crate::core::sync::WaitLock)s
 *
 * ## Guard Types
 *
 * - **ResourceOwner**: Owns the resource and the raw lock
 * - **ExclusiveLockHolder**: Single writer
 * - **ConcurrentLockHolder**: Many readers (shared mutex only)
 *
 * ## Example
 *
 * ```rust
 * use ai_os_sync::core::guard::{EnabledTracking, ResourceOwner};
 *
 * let owner: ResourceOwner<u64, EnabledTracking> = ResourceOwner::new(0);
 *
 * let mut holder = owner.exclusive();
 * *holder += 1;
 * assert!(holder.information().is_some());
 *
 * holder.unlock().unwrap();
 * assert!(owner.exclusive_information().is_none());
 * ```
 */

mod concurrent;
mod exclusive;
mod mutex;
mod owner;
mod tracking;
mod traits;

pub use concurrent::ConcurrentLockHolder;
pub use exclusive::ExclusiveLockHolder;
pub use mutex::{MutexKind, PlainMutex, SharedMutex, SharedMutexKind};
pub use owner::ResourceOwner;
pub use tracking::{
    clear_logging_callback, clear_tracking_predicate, disable_tracking, enable_tracking,
    init_tracking_from_env, is_tracking_enabled, set_logging_callback, set_tracking_predicate,
    DisabledTracking, EnabledTracking, HolderId, LockInformation, LockKind, LockRegistry,
    LoggingCallback, NoRegistry, RuntimeTracking, TrackedRegistry, TrackingPolicy,
    TrackingPredicate,
};
pub use traits::{release_all, Guard};
