/*!
 * AI-OS Sync - Demo Entry Point
 *
 * Exercises the primitives end to end:
 * - Two threads incrementing a shared counter through exclusive holders
 * - A producer/consumer hand-off over a condvar signal
 * - A worker pool draining a batch of tasks
 */

use ai_os_sync::core::guard::{ResourceOwner, RuntimeTracking};
use ai_os_sync::core::sync::Signal;
use ai_os_sync::{init_tracing, init_tracking_from_env, HoldSpan, PoolConfig, SyncThreadPool};
use anyhow::{bail, Context, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::info;

const INCREMENTS_PER_THREAD: u64 = 500_000;
const POOL_TASKS: usize = 1_000;

fn main() -> Result<()> {
    init_tracing();
    init_tracking_from_env();

    info!("AI-OS sync demo starting...");

    counter_demo()?;
    hand_off_demo()?;
    pool_demo()?;

    info!("demo complete");
    Ok(())
}

fn counter_demo() -> Result<()> {
    let _hold = HoldSpan::new("counter_demo");
    let counter: Arc<ResourceOwner<u64, RuntimeTracking>> = Arc::new(ResourceOwner::new(0));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..INCREMENTS_PER_THREAD {
                    *counter.exclusive() += 1;
                }
            })
        })
        .collect();

    for worker in workers {
        if worker.join().is_err() {
            bail!("counter thread panicked");
        }
    }

    let total = *counter.concurrent();
    info!(total, "counter demo finished");
    if total != 2 * INCREMENTS_PER_THREAD {
        bail!("lost updates: expected {}, got {}", 2 * INCREMENTS_PER_THREAD, total);
    }
    Ok(())
}

fn hand_off_demo() -> Result<()> {
    let mailbox: Arc<ResourceOwner<Option<String>, RuntimeTracking>> =
        Arc::new(ResourceOwner::new(None));
    let delivered = Arc::new(Signal::auto_reset());

    let consumer = {
        let mailbox = mailbox.clone();
        let delivered = delivered.clone();
        thread::spawn(move || -> Result<String> {
            let mut holder = mailbox.exclusive();
            holder.wait_with(&delivered, |slot| slot.is_some())?;
            holder.get_mut()?.take().context("mailbox empty after wake-up")
        })
    };

    {
        let mut holder = mailbox.exclusive();
        *holder = Some("hello from producer".to_string());
        if let Some(info) = holder.information() {
            info!(kind = ?info.kind, location = %info.location, "producer holds mailbox");
        }
    }
    delivered.signalize();

    let message = match consumer.join() {
        Ok(result) => result?,
        Err(_) => bail!("consumer thread panicked"),
    };
    info!(
        %message,
        live_holders = mailbox.lock_information().len(),
        "hand-off demo finished"
    );
    Ok(())
}

fn pool_demo() -> Result<()> {
    let pool = SyncThreadPool::new(PoolConfig::from_env()).context("starting thread pool")?;
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..POOL_TASKS {
        let done = done.clone();
        pool.add_task(move || {
            done.fetch_add(1, Ordering::Relaxed);
        })?;
    }

    let sum = pool.add_waitable_task(|| (1..=100u32).sum::<u32>())?.wait()?;
    pool.shutdown();

    info!(
        workers = pool.pool_size(),
        completed = pool.completed_tasks(),
        sum,
        "pool demo finished"
    );
    if done.load(Ordering::Relaxed) != POOL_TASKS {
        bail!("pool dropped tasks");
    }
    Ok(())
}
