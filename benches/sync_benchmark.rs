/*!
 * Synchronization Primitives Benchmarks
 *
 * Compare signal backends, holder kinds and tracking policies
 */

use ai_os_sync::core::guard::{
    DisabledTracking, EnabledTracking, PlainMutex, ResourceOwner, RuntimeTracking, SharedMutex,
};
use ai_os_sync::core::sync::{ResetPolicy, SemaphoreSignal, Signal};
use ai_os_sync::pool::SyncThreadPool;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;

fn bench_wake_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("wake_latency");

    group.bench_function("condvar", |b| {
        b.iter(|| {
            let owner: Arc<ResourceOwner<bool, DisabledTracking, PlainMutex>> =
                Arc::new(ResourceOwner::new(false));
            let signal = Arc::new(Signal::auto_reset());
            let (owner_clone, signal_clone) = (owner.clone(), signal.clone());

            let handle = thread::spawn(move || {
                let mut holder = owner_clone.exclusive();
                holder.wait_with(&signal_clone, |ready| *ready).ok();
            });

            *owner.exclusive() = true;
            signal.signalize();
            handle.join().ok();
        });
    });

    group.bench_function("semaphore", |b| {
        b.iter(|| {
            let signal = Arc::new(SemaphoreSignal::new(ResetPolicy::Auto));
            let signal_clone = signal.clone();

            let handle = thread::spawn(move || signal_clone.wait());

            signal.signalize();
            handle.join().ok();
        });
    });

    group.finish();
}

fn bench_uncontended_signal(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_round_trip");

    for policy in [ResetPolicy::Auto, ResetPolicy::Manual] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", policy)),
            &policy,
            |b, &policy| {
                let signal = SemaphoreSignal::new(policy);
                b.iter(|| {
                    signal.signalize();
                    black_box(signal.wait());
                    signal.reset();
                });
            },
        );
    }

    group.finish();
}

fn bench_acquisition(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquisition");

    let shared: ResourceOwner<u64, DisabledTracking, SharedMutex> = ResourceOwner::new(0);
    group.bench_function("exclusive/shared_mutex", |b| {
        b.iter(|| *shared.exclusive() += 1);
    });
    group.bench_function("concurrent/shared_mutex", |b| {
        b.iter(|| black_box(*shared.concurrent()));
    });

    let plain: ResourceOwner<u64, DisabledTracking, PlainMutex> = ResourceOwner::new(0);
    group.bench_function("exclusive/plain_mutex", |b| {
        b.iter(|| *plain.exclusive() += 1);
    });

    group.finish();
}

fn bench_tracking_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking_overhead");

    let disabled: ResourceOwner<u64, DisabledTracking> = ResourceOwner::new(0);
    group.bench_function("disabled", |b| b.iter(|| *disabled.exclusive() += 1));

    let enabled: ResourceOwner<u64, EnabledTracking> = ResourceOwner::new(0);
    group.bench_function("enabled", |b| b.iter(|| *enabled.exclusive() += 1));

    let runtime: ResourceOwner<u64, RuntimeTracking> = ResourceOwner::new(0);
    group.bench_function("runtime_off", |b| b.iter(|| *runtime.exclusive() += 1));

    group.finish();
}

fn bench_pool_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_throughput");
    group.sample_size(20);

    for workers in [1, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let pool = SyncThreadPool::with_workers(workers).unwrap();
            b.iter(|| {
                let handles: Vec<_> = (0..256u64)
                    .map(|i| pool.add_waitable_task(move || black_box(i * 2)).unwrap())
                    .collect();
                for handle in handles {
                    black_box(handle.wait().ok());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_wake_latency,
    bench_uncontended_signal,
    bench_acquisition,
    bench_tracking_overhead,
    bench_pool_throughput
);
criterion_main!(benches);
