/*!
 * Guard Traits
 *
 * Core abstraction shared by the lock holders
 */

use super::tracking::LockKind;
use crate::core::errors::LockResult;

/// Common surface of every RAII lock holder
///
/// Lets code that only needs to release or inspect a holder take
/// `&mut dyn Guard` regardless of access mode or resource type.
pub trait Guard {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    fn lock_kind(&self) -> LockKind;

    /// Whether the holder currently owns its lock
    fn is_active(&self) -> bool;

    /// Manually release the lock
    ///
    /// Returns `Err` if already released
    fn release(&mut self) -> LockResult<()>;
}

/// Release every active guard, ignoring ones already released
///
/// Returns how many were released.
pub fn release_all(guards: &mut [&mut dyn Guard]) -> usize {
    guards
        .iter_mut()
        .filter(|guard| guard.is_active())
        .filter_map(|guard| guard.release().ok())
        .count()
}
