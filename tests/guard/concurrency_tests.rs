/*!
 * Concurrency Tests
 *
 * Mutual exclusion and reader parallelism across real threads
 */

use ai_os_sync::core::guard::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_exclusive_counter_no_lost_updates() {
    const THREADS: usize = 2;
    const INCREMENTS: u64 = 500_000;

    let counter: Arc<ResourceOwner<u64>> = Arc::new(ResourceOwner::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..INCREMENTS {
                    *counter.exclusive() += 1;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*counter.concurrent(), THREADS as u64 * INCREMENTS);
}

#[test]
fn test_plain_mutex_counter_with_relock() {
    let counter: Arc<ResourceOwner<u64, DisabledTracking, PlainMutex>> = Arc::new(ResourceOwner::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                let mut holder = counter.exclusive();
                for _ in 0..10_000 {
                    *holder += 1;
                    holder.unlock().unwrap();
                    holder.lock().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*counter.exclusive(), 40_000);
}

#[test]
fn test_readers_hold_in_parallel() {
    const READERS: usize = 4;

    let owner: Arc<ResourceOwner<Vec<u32>>> = Arc::new(ResourceOwner::new(vec![1, 2, 3]));
    let barrier = Arc::new(Barrier::new(READERS));

    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let (owner, barrier) = (owner.clone(), barrier.clone());
            thread::spawn(move || {
                let reader = owner.concurrent();
                // Every reader is inside the critical section at once
                barrier.wait();
                reader.iter().sum::<u32>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 6);
    }
}

#[test]
fn test_writer_excludes_readers() {
    let owner: Arc<ResourceOwner<u32>> = Arc::new(ResourceOwner::new(0));
    let writer_done = Arc::new(AtomicBool::new(false));

    let mut writer = owner.exclusive();

    let reader = {
        let (owner, writer_done) = (owner.clone(), writer_done.clone());
        thread::spawn(move || {
            assert!(owner.try_concurrent_for(Duration::from_millis(20)).is_none());
            let value = *owner.concurrent();
            (value, writer_done.load(Ordering::SeqCst))
        })
    };

    thread::sleep(Duration::from_millis(80));
    *writer = 7;
    writer_done.store(true, Ordering::SeqCst);
    writer.unlock().unwrap();

    assert_eq!(reader.join().unwrap(), (7, true));
}

#[test]
fn test_try_exclusive_for_times_out_under_reader() {
    let owner: ResourceOwner<u32> = ResourceOwner::new(0);
    let reader = owner.concurrent();

    assert!(owner.try_exclusive().is_none());
    assert!(owner.try_exclusive_for(Duration::from_millis(10)).is_none());
    assert!(owner.try_concurrent().is_some());

    drop(reader);
    assert!(owner.try_exclusive().is_some());
}

#[test]
fn test_drain_waits_for_holders() {
    let owner: Arc<ResourceOwner<Vec<u32>>> = Arc::new(ResourceOwner::new(Vec::new()));
    let finished = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(Barrier::new(2));

    let worker = {
        let (owner, finished, started) = (owner.clone(), finished.clone(), started.clone());
        thread::spawn(move || {
            let mut holder = owner.exclusive();
            started.wait();
            thread::sleep(Duration::from_millis(50));
            holder.push(1);
            finished.fetch_add(1, Ordering::SeqCst);
        })
    };

    started.wait();
    owner.drain();
    assert_eq!(finished.load(Ordering::SeqCst), 1);

    worker.join().unwrap();
    let owner = Arc::try_unwrap(owner).unwrap();
    assert_eq!(owner.into_inner(), vec![1]);
}
