use super::{
    dispatch_reminder::{DispatchReminderUseCase, DispatchResult},
    reschedule_reminder::{RescheduleOutcome, RescheduleReminderUseCase},
    scan_due_reminders::ScanDueRemindersUseCase,
};
use crate::shared::usecase::{execute, UseCase};
use futures::{stream, FutureExt, StreamExt};
use pillbox_domain::Reminder;
use pillbox_infra::PillboxContext;
use std::{fmt::Display, panic::AssertUnwindSafe};
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Runs one reminder cycle: every `Reminder` due at `now` is dispatched and
/// then rescheduled. Items are processed concurrently and independently of
/// each other, one failing item never stops the others.
#[derive(Debug)]
pub struct ProcessDueRemindersUseCase {
    pub now: i64,
}

/// Summary of a single reminder cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub due: usize,
    /// Items where the owner was resolved and the channels were tried
    pub dispatched: usize,
    pub email_sent: usize,
    pub push_sent: usize,
    /// Items committed without dispatch because the owner no longer exists
    pub owner_missing: usize,
    pub committed: usize,
    /// Items edited or deleted while they were dispatched, their stored
    /// schedule is kept
    pub superseded: usize,
    /// Items left due because the new schedule could not be stored
    pub commit_failed: usize,
    /// Items not touched at all, they are retried on the next cycle or, for
    /// broken schedules, need to be fixed by hand
    pub skipped: usize,
    pub panicked: usize,
}

impl Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "due: {}, dispatched: {}, emails sent: {}, push sent: {}, owner missing: {}, committed: {}, superseded: {}, commit failed: {}, skipped: {}, panicked: {}",
            self.due,
            self.dispatched,
            self.email_sent,
            self.push_sent,
            self.owner_missing,
            self.committed,
            self.superseded,
            self.commit_failed,
            self.skipped,
            self.panicked
        )
    }
}

#[derive(Debug)]
enum ItemOutcome {
    Skipped,
    Processed {
        dispatch: Option<DispatchResult>,
        /// `None` if the commit failed
        commit: Option<RescheduleOutcome>,
    },
    Panicked,
}

impl CycleReport {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Panicked => self.panicked += 1,
            ItemOutcome::Processed { dispatch, commit } => {
                match dispatch {
                    Some(res) => {
                        self.dispatched += 1;
                        self.email_sent += res.primary_ok as usize;
                        self.push_sent += res.secondary_ok as usize;
                    }
                    None => self.owner_missing += 1,
                }
                match commit {
                    Some(RescheduleOutcome::Rescheduled { .. }) => self.committed += 1,
                    Some(RescheduleOutcome::Superseded) => self.superseded += 1,
                    None => self.commit_failed += 1,
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    ScanFailed,
}

/// Pre-check, resolve owner, dispatch and commit a single due `Reminder`
async fn process_reminder(reminder: Reminder, now: i64, ctx: &PillboxContext) -> ItemOutcome {
    // A schedule that cannot produce a next occurrence would be dispatched
    // on every cycle without ever being committed
    let reference = now.max(reminder.next_run_at);
    if let Err(e) = reminder
        .schedule
        .next_run_after(&ctx.config.timezone, reference)
    {
        error!(
            "Reminder: {} has a schedule without an upcoming occurrence, skipping it. Error: {:?}",
            reminder.id, e
        );
        return ItemOutcome::Skipped;
    }

    let contact = match timeout(
        ctx.config.reminder_store_timeout,
        ctx.repos.users.resolve_contact(&reminder.user_id),
    )
    .await
    {
        Ok(Ok(contact)) => contact,
        Ok(Err(e)) => {
            error!(
                "Unable to resolve the owner of reminder: {}, it stays due. Error: {:?}",
                reminder.id, e
            );
            return ItemOutcome::Skipped;
        }
        Err(_) => {
            error!(
                "Resolving the owner of reminder: {} timed out, it stays due.",
                reminder.id
            );
            return ItemOutcome::Skipped;
        }
    };

    let dispatch = match contact {
        Some(contact) => {
            let usecase = DispatchReminderUseCase {
                reminder: reminder.clone(),
                contact,
            };
            match execute(usecase, ctx).await {
                Ok(res) => Some(res),
                Err(never) => match never {},
            }
        }
        None => {
            warn!(
                "Owner: {} of reminder: {} was not found, rescheduling without notifying.",
                reminder.user_id, reminder.id
            );
            None
        }
    };
    debug!("Reminder: {} dispatch result: {:?}", reminder.id, dispatch);

    let commit = execute(RescheduleReminderUseCase { reminder, now }, ctx)
        .await
        .ok();

    ItemOutcome::Processed { dispatch, commit }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessDueRemindersUseCase {
    type Response = CycleReport;
    type Error = UseCaseError;

    const NAME: &'static str = "ProcessDueReminders";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        let due = execute(ScanDueRemindersUseCase { now: self.now }, ctx)
            .await
            .map_err(|_| UseCaseError::ScanFailed)?;

        let now = self.now;
        let mut report = CycleReport {
            due: due.len(),
            ..Default::default()
        };

        let outcomes = stream::iter(due)
            .map(|reminder| {
                let reminder_id = reminder.id.clone();
                async move {
                    match AssertUnwindSafe(process_reminder(reminder, now, ctx))
                        .catch_unwind()
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            error!("Processing of reminder: {} panicked", reminder_id);
                            ItemOutcome::Panicked
                        }
                    }
                }
            })
            .buffer_unordered(ctx.config.reminder_dispatch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for outcome in &outcomes {
            report.record(outcome);
        }

        Ok(report)
    }
}
