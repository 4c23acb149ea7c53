/*!
 * Lock Tracking Tests
 *
 * Runtime toggle, predicates and the logging callback share process-wide
 * state, so every test here runs serially.
 */

use ai_os_sync::core::guard::*;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Audited;

fn is_audited(info: &LockInformation) -> bool {
    info.resource_type.is_some_and(|name| name.ends_with("Audited"))
}

fn reset_tracking() {
    disable_tracking();
    clear_tracking_predicate();
    clear_logging_callback();
}

#[test]
#[serial]
fn test_enabled_tracking_records_holders() {
    reset_tracking();
    let owner: ResourceOwner<Audited, EnabledTracking> = ResourceOwner::default();

    let writer = owner.exclusive();
    let info = owner.exclusive_information().unwrap();
    assert_eq!(info.kind, LockKind::Exclusive);
    assert_eq!(info.mutex_type, "shared_mutex");
    assert_eq!(info.location.file(), file!());
    assert!(is_audited(&info));
    drop(writer);

    let first = owner.concurrent();
    let second = owner.concurrent();
    assert_eq!(owner.concurrent_information().len(), 2);
    assert_ne!(first.id(), second.id());
    assert_eq!(first.information().unwrap().kind, LockKind::Concurrent);

    drop(first);
    assert_eq!(owner.lock_information().len(), 1);
    drop(second);
    assert!(owner.lock_information().is_empty());
}

#[test]
#[serial]
fn test_disabled_tracking_records_nothing() {
    reset_tracking();
    let owner: ResourceOwner<Audited, DisabledTracking> = ResourceOwner::default();

    let _writer = owner.exclusive();
    assert!(owner.exclusive_information().is_none());
    assert!(owner.lock_information().is_empty());
}

#[test]
#[serial]
fn test_runtime_toggle() {
    reset_tracking();
    let owner: ResourceOwner<Audited, RuntimeTracking> = ResourceOwner::default();

    {
        let _writer = owner.exclusive();
        assert!(owner.exclusive_information().is_none());
    }

    RuntimeTracking::enable_tracking();
    assert!(is_tracking_enabled());
    {
        let _writer = owner.exclusive();
        assert!(owner.exclusive_information().is_some());
    }

    // An entry recorded while enabled is removed even if tracking was
    // switched off in between
    let reader = owner.concurrent();
    disable_tracking();
    assert_eq!(owner.concurrent_information().len(), 1);
    drop(reader);
    assert!(owner.concurrent_information().is_empty());

    reset_tracking();
}

#[test]
#[serial]
fn test_tracking_predicate_overrides_toggle() {
    reset_tracking();
    let owner: ResourceOwner<Audited, RuntimeTracking> = ResourceOwner::default();

    set_tracking_predicate(|| true);
    assert!(!is_tracking_enabled());
    {
        let _writer = owner.exclusive();
        assert!(owner.exclusive_information().is_some());
    }

    enable_tracking();
    set_tracking_predicate(|| false);
    {
        let _writer = owner.exclusive();
        assert!(owner.exclusive_information().is_none());
    }

    reset_tracking();
}

#[test]
#[serial]
fn test_logging_callback_sees_acquisitions() {
    reset_tracking();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    set_logging_callback(move |info| {
        if is_audited(info) {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    let owner: ResourceOwner<Audited, EnabledTracking> = ResourceOwner::default();
    {
        let mut writer = owner.exclusive();
        writer.unlock().unwrap();
        writer.lock().unwrap();
    }
    let _reader = owner.concurrent();
    assert_eq!(seen.load(Ordering::SeqCst), 3);

    // Untracked owners never reach the callback
    let quiet: ResourceOwner<Audited> = ResourceOwner::default();
    drop(quiet.exclusive());
    assert_eq!(seen.load(Ordering::SeqCst), 3);

    reset_tracking();
}

#[test]
#[serial]
fn test_panicking_callback_is_contained() {
    reset_tracking();
    set_logging_callback(|_| panic!("callback failure"));

    let owner: ResourceOwner<Audited, EnabledTracking> = ResourceOwner::default();
    let writer = owner.exclusive();
    assert!(writer.owns_lock());
    assert!(owner.exclusive_information().is_some());
    drop(writer);

    reset_tracking();
}

#[test]
#[serial]
fn test_panicking_predicate_does_not_leak_lock() {
    reset_tracking();
    set_tracking_predicate(|| panic!("predicate failure"));

    let owner: ResourceOwner<Audited, RuntimeTracking> = ResourceOwner::default();
    let acquired = panic::catch_unwind(AssertUnwindSafe(|| {
        let writer = owner.exclusive();
        writer.owns_lock()
    }));
    assert_eq!(acquired.ok(), Some(true));
    assert!(owner.exclusive_information().is_none());

    // The lock was released normally and stays usable in both modes
    assert!(owner.try_exclusive_for(Duration::from_millis(100)).is_some());
    let reader = owner.concurrent();
    assert!(reader.owns_lock());
    drop(reader);

    reset_tracking();
}
