use crate::{
    reminder::process_due_reminders::{CycleReport, ProcessDueRemindersUseCase},
    shared::usecase::execute,
};
use futures::{future::join_all, FutureExt};
use pillbox_infra::PillboxContext;
use std::{
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{error, info, warn};

/// Time until the next multiple of `interval` since the unix epoch, so that
/// cycles run at predictable wall clock times. Exactly on a boundary the
/// whole interval is returned.
pub fn get_start_delay(now_ts: i64, interval: Duration) -> Duration {
    let interval_millis = (interval.as_millis() as i64).max(1);
    let millis_to_next_run = interval_millis - now_ts.rem_euclid(interval_millis);
    Duration::from_millis(millis_to_next_run as u64)
}

/// Sends reminders for every due `Reminder`. At most one cycle is in flight
/// at any time.
pub struct SendRemindersJob {
    ctx: PillboxContext,
    in_flight: AtomicBool,
}

/// Releases the in flight flag even if the cycle unwinds
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SendRemindersJob {
    pub fn new(ctx: PillboxContext) -> Self {
        Self {
            ctx,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs a single cycle. Returns `None` if the cycle was skipped because
    /// the previous one is still running, or if it failed.
    pub async fn run_cycle(&self) -> Option<CycleReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("The previous reminder cycle is still running, skipping this tick");
            return None;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let usecase = ProcessDueRemindersUseCase {
            now: self.ctx.sys.get_timestamp_millis(),
        };
        match AssertUnwindSafe(execute(usecase, &self.ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(report)) => {
                info!("Reminder cycle completed. {}", report);
                Some(report)
            }
            // Already logged by the executor
            Ok(Err(_)) => None,
            Err(_) => {
                error!("Reminder cycle panicked");
                None
            }
        }
    }
}

pub struct SendRemindersJobHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SendRemindersJobHandle {
    /// Stops scheduling new cycles and waits for the cycle in flight, if any
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("Send reminders job did not stop cleanly: {:?}", e);
        }
        info!("Send reminders job stopped");
    }
}

pub fn start_send_reminders_job(ctx: PillboxContext) -> SendRemindersJobHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let scan_interval = ctx.config.reminder_scan_interval;
    let start_delay = get_start_delay(ctx.sys.get_timestamp_millis(), scan_interval);
    let job = Arc::new(SendRemindersJob::new(ctx));

    let task = actix_web::rt::spawn(async move {
        info!(
            "Send reminders job starts in {:?} and runs every {:?}",
            start_delay, scan_interval
        );
        let mut ticks = interval_at(Instant::now() + start_delay, scan_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles: Vec<JoinHandle<()>> = Vec::new();

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    cycles.retain(|cycle| !cycle.is_finished());
                    let job = job.clone();
                    cycles.push(actix_web::rt::spawn(async move {
                        job.run_cycle().await;
                    }));
                }
                _ = shutdown_rx.changed() => break,
            }
        }

        join_all(cycles).await;
    });

    SendRemindersJobHandle { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{default_now, insert_reminder, insert_user, setup};

    #[test]
    fn start_delay_works() {
        let minute = Duration::from_secs(60);
        assert_eq!(get_start_delay(50 * 1000, minute), Duration::from_secs(10));
        assert_eq!(get_start_delay(60 * 1000, minute), minute);
        assert_eq!(get_start_delay(59 * 1000, minute), Duration::from_secs(1));
        assert_eq!(get_start_delay(59_500, minute), Duration::from_millis(500));
        assert_eq!(
            get_start_delay(125 * 1000, Duration::from_secs(30)),
            Duration::from_secs(25)
        );
        assert_eq!(
            get_start_delay(0, Duration::from_secs(3600)),
            Duration::from_secs(3600)
        );
    }

    #[actix_web::test]
    async fn skips_cycle_while_previous_is_in_flight() {
        let test = setup();
        let user = insert_user(&test.ctx, None).await;
        insert_reminder(&test.ctx, &user.id, "Aspirin", default_now()).await;
        test.reminders.set_scan_delay(Duration::from_millis(100));

        let job = SendRemindersJob::new(test.ctx.clone());
        let (first, second) = futures::join!(job.run_cycle(), async {
            // Let the first cycle start and block on the slow scan
            tokio::time::sleep(Duration::from_millis(20)).await;
            job.run_cycle().await
        });

        let first = first.expect("First cycle to run");
        assert_eq!(first.due, 1);
        assert_eq!(first.committed, 1);
        assert!(second.is_none());
        assert_eq!(test.email.attempts().len(), 1);

        // The guard is released again once the cycle is done
        test.sys.advance(24 * 60 * 60 * 1000);
        let third = job.run_cycle().await.expect("Third cycle to run");
        assert_eq!(third.due, 1);
    }

    #[actix_web::test]
    async fn job_sends_reminders_until_stopped() {
        let test = setup();
        let user = insert_user(&test.ctx, None).await;
        insert_reminder(&test.ctx, &user.id, "Aspirin", default_now()).await;

        // Scan interval is 100 millis in tests
        let handle = start_send_reminders_job(test.ctx.clone());
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.stop().await;

        let attempts = test.email.attempts().len();
        assert_eq!(attempts, 1);
        let due = test.ctx.repos.reminders.find_due(default_now()).await.unwrap();
        assert!(due.is_empty());

        // No more cycles after stop
        test.sys.advance(24 * 60 * 60 * 1000);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(test.email.attempts().len(), attempts);
    }
}
