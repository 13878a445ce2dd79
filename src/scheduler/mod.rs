//! Fixed-interval scheduler for the refresh cycle.
//!
//! Runs one cycle shortly after process start (warm-up delay), then on every
//! interval tick. Ticks that arrive while a cycle is still in flight are
//! skipped, not queued; the skip is logged and counted.

use crate::config::ScheduleConfig;
use crate::cycle::{CycleDriver, CycleGuard, CycleOptions, Target};
use crate::diagnostics::health;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{self, Duration, MissedTickBehavior};

const MIN_INTERVAL_SECS: u64 = 5;

pub async fn run(
    schedule: ScheduleConfig,
    targets: Vec<Target>,
    options: CycleOptions,
    driver: Arc<CycleDriver>,
    guard: CycleGuard,
) {
    run_with(schedule, guard, move || {
        let driver = Arc::clone(&driver);
        let targets = targets.clone();
        let options = options.clone();
        async move {
            let report = driver.run_cycle(&targets, &options).await;
            if report.all_succeeded() {
                health::mark_component_ok("cycle");
            } else {
                health::mark_component_error(
                    "cycle",
                    format!(
                        "{} of {} targets failed",
                        report.failed(),
                        report.outcomes.len()
                    ),
                );
            }
            health::record_cycle(&report);
        }
    })
    .await;
}

/// Scheduler loop with the cycle factored out so tests can observe tick and
/// skip behavior directly.
pub async fn run_with<F, Fut>(schedule: ScheduleConfig, guard: CycleGuard, mut cycle: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let warmup = Duration::from_secs(schedule.warmup_secs);
    if !warmup.is_zero() {
        tracing::info!(warmup_secs = schedule.warmup_secs, "scheduler warming up");
        time::sleep(warmup).await;
    }

    let interval_secs = schedule.interval_secs.max(MIN_INTERVAL_SECS);
    let mut interval = time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    health::mark_component_ok("scheduler");
    tracing::info!(interval_secs, "scheduler started");

    loop {
        interval.tick().await;

        let Some(slot) = guard.try_acquire() else {
            tracing::warn!("previous cycle still in flight; skipping tick");
            health::record_skipped_tick();
            continue;
        };

        health::mark_component_ok("scheduler");
        let fut = cycle();
        tokio::spawn(async move {
            fut.await;
            drop(slot);
        });
    }
}
