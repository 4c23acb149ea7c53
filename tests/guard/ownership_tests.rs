/*!
 * Ownership State Tests
 *
 * Holder state machine: Locked <-> Unlocked, with misuse reported as errors
 */

use ai_os_sync::core::errors::OwnershipError;
use ai_os_sync::core::guard::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Lock,
    TryLock,
    Unlock,
    Write(u8),
    Read,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Lock),
        Just(Op::TryLock),
        Just(Op::Unlock),
        any::<u8>().prop_map(Op::Write),
        Just(Op::Read),
    ]
}

proptest! {
    #[test]
    fn exclusive_holder_follows_state_machine(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let owner: ResourceOwner<u8> = ResourceOwner::new(0);
        let mut holder = owner.exclusive();
        let mut locked = true;
        let mut value = 0u8;

        for op in ops {
            match op {
                Op::Lock => {
                    let result = holder.lock();
                    prop_assert_eq!(result.is_ok(), !locked);
                    if !locked {
                        locked = true;
                    } else {
                        let is_already_locked = matches!(result, Err(OwnershipError::AlreadyLocked { .. }));
                        prop_assert!(is_already_locked);
                    }
                }
                Op::TryLock => {
                    let result = holder.try_lock();
                    if locked {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert_eq!(result, Ok(true));
                        locked = true;
                    }
                }
                Op::Unlock => {
                    let result = holder.unlock();
                    if locked {
                        prop_assert!(result.is_ok());
                        locked = false;
                    } else {
                        let is_not_locked = matches!(result, Err(OwnershipError::NotLocked { .. }));
                        prop_assert!(is_not_locked);
                    }
                }
                Op::Write(byte) => match holder.get_mut() {
                    Ok(slot) => {
                        prop_assert!(locked);
                        *slot = byte;
                        value = byte;
                    }
                    Err(_) => prop_assert!(!locked),
                },
                Op::Read => match holder.get() {
                    Ok(current) => prop_assert_eq!(*current, value),
                    Err(_) => prop_assert!(!locked),
                },
            }

            prop_assert_eq!(holder.owns_lock(), locked);
            // Only an unlocked holder leaves the owner free
            prop_assert_eq!(owner.try_concurrent().is_some(), !locked);
        }

        drop(holder);
        prop_assert_eq!(*owner.concurrent(), value);
    }
}

#[test]
fn test_concurrent_holder_misuse() {
    let owner: ResourceOwner<u32> = ResourceOwner::new(9);
    let mut reader = owner.concurrent();

    assert!(matches!(reader.lock(), Err(OwnershipError::AlreadyLocked { .. })));
    reader.unlock().unwrap();
    assert!(matches!(reader.unlock(), Err(OwnershipError::NotLocked { .. })));
    assert!(reader.get().is_err());

    reader.lock().unwrap();
    assert_eq!(*reader.get().unwrap(), 9);
}

#[test]
fn test_moved_holder_keeps_lock() {
    let owner: ResourceOwner<Vec<u8>, EnabledTracking> = ResourceOwner::new(Vec::new());

    let holder = owner.exclusive();
    let mut moved = holder;
    moved.push(1);

    assert!(moved.owns_lock());
    assert!(owner.exclusive_information().is_some());
    assert!(owner.try_exclusive().is_none());

    drop(moved);
    assert!(owner.exclusive_information().is_none());
    assert_eq!(owner.into_inner(), vec![1]);
}

#[test]
fn test_error_messages_name_operation() {
    let owner: ResourceOwner<u32> = ResourceOwner::new(0);
    let mut holder = owner.exclusive();

    let err = holder.lock().unwrap_err();
    assert!(err.to_string().contains("lock"));

    holder.unlock().unwrap();
    let err = holder.get().unwrap_err();
    assert!(err.to_string().contains("get"));
}

#[test]
fn test_plain_mutex_owner() {
    let owner: ResourceOwner<String, DisabledTracking, PlainMutex> = ResourceOwner::new(String::from("a"));
    {
        let mut holder = owner.exclusive();
        holder.push('b');
        assert!(owner.try_exclusive().is_none());
    }
    assert_eq!(owner.into_inner(), "ab");
}

#[test]
fn test_guard_trait_release() {
    let owner: ResourceOwner<u32> = ResourceOwner::new(0);
    let mut holder = owner.exclusive();

    assert_eq!(holder.lock_kind(), LockKind::Exclusive);
    assert!(holder.is_active());
    holder.release().unwrap();
    assert!(!holder.is_active());
    assert!(holder.release().is_err());
}
