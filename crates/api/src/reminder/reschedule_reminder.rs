use crate::shared::usecase::UseCase;
use pillbox_domain::{RecurrenceError, Reminder};
use pillbox_infra::PillboxContext;
use tokio::time::timeout;
use tracing::{error, info};

/// Moves a dispatched `Reminder` forward to its next occurrence. The new
/// `next_run_at` is strictly after both `now` and the occurrence that was
/// just handled, so a `Reminder` can never be handled twice for the same
/// occurrence once this succeeds.
///
/// `reminder` is the snapshot read by the scan. If the stored `Reminder` was
/// edited or deleted since then it is left as it is.
#[derive(Debug)]
pub struct RescheduleReminderUseCase {
    pub reminder: Reminder,
    pub now: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleOutcome {
    Rescheduled { next_run_at: i64 },
    /// The `Reminder` changed while it was being dispatched
    Superseded,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidSchedule(RecurrenceError),
    StorageError(anyhow::Error),
    StorageTimeout,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RescheduleReminderUseCase {
    type Response = RescheduleOutcome;
    type Error = UseCaseError;

    const NAME: &'static str = "RescheduleReminder";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        let reference = self.now.max(self.reminder.next_run_at);
        let next_run_at = self
            .reminder
            .schedule
            .next_run_after(&ctx.config.timezone, reference)
            .map_err(UseCaseError::InvalidSchedule)?;

        let res = timeout(
            ctx.config.reminder_store_timeout,
            ctx.repos
                .reminders
                .update_next_run(&self.reminder, next_run_at),
        )
        .await;

        match res {
            Ok(Ok(true)) => Ok(RescheduleOutcome::Rescheduled { next_run_at }),
            Ok(Ok(false)) => {
                info!(
                    "Reminder: {} was changed while it was dispatched, keeping the stored schedule",
                    self.reminder.id
                );
                Ok(RescheduleOutcome::Superseded)
            }
            Ok(Err(e)) => {
                error!(
                    "Unable to reschedule reminder: {}, it stays due. Error: {:?}",
                    self.reminder.id, e
                );
                Err(UseCaseError::StorageError(e))
            }
            Err(_) => {
                error!(
                    "Rescheduling reminder: {} timed out, it stays due.",
                    self.reminder.id
                );
                Err(UseCaseError::StorageTimeout)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{default_now, insert_reminder, insert_user, setup};
    use chrono::{TimeZone, Utc};
    use pillbox_domain::{ReminderContent, ReminderSchedule, Tz};
    use std::sync::atomic::Ordering;

    fn at(day: u32, hour: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[actix_web::test]
    async fn moves_overdue_reminder_past_now() {
        let test = setup();
        let user = insert_user(&test.ctx, None).await;
        // Daily at 09:00, last handled a week ago and now is 2024-01-15 10:00
        let reminder = insert_reminder(&test.ctx, &user.id, "Aspirin", at(8, 9)).await;

        let next = RescheduleReminderUseCase {
            reminder: reminder.clone(),
            now: default_now(),
        }
        .execute(&test.ctx)
        .await
        .expect("To reschedule");

        assert_eq!(
            next,
            RescheduleOutcome::Rescheduled {
                next_run_at: at(16, 9)
            }
        );
        let stored = test.ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(stored.next_run_at, at(16, 9));
    }

    #[actix_web::test]
    async fn moves_reminder_due_exactly_now_to_following_occurrence() {
        let test = setup();
        test.sys.set(at(15, 9));
        let user = insert_user(&test.ctx, None).await;
        let reminder = insert_reminder(&test.ctx, &user.id, "Aspirin", at(15, 9)).await;

        let next = RescheduleReminderUseCase {
            reminder,
            now: at(15, 9),
        }
        .execute(&test.ctx)
        .await
        .unwrap();
        assert_eq!(
            next,
            RescheduleOutcome::Rescheduled {
                next_run_at: at(16, 9)
            }
        );
    }

    #[actix_web::test]
    async fn keeps_schedule_edited_during_dispatch() {
        let test = setup();
        let user = insert_user(&test.ctx, None).await;
        // Daily at 09:00, due since 2024-01-15 09:00 and now is 10:00
        let snapshot = insert_reminder(&test.ctx, &user.id, "Aspirin", at(15, 9)).await;

        let mut edited = snapshot.clone();
        edited
            .update(
                ReminderContent::new("Aspirin", "1 tablet", None).unwrap(),
                ReminderSchedule {
                    time_of_day: "18:30".parse().unwrap(),
                    ..snapshot.schedule.clone()
                },
                &Tz::UTC,
                default_now(),
            )
            .unwrap();
        test.ctx.repos.reminders.save(&edited).await.unwrap();
        let evening = Utc
            .with_ymd_and_hms(2024, 1, 15, 18, 30, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(edited.next_run_at, evening);

        let res = RescheduleReminderUseCase {
            reminder: snapshot,
            now: default_now(),
        }
        .execute(&test.ctx)
        .await
        .expect("A changed reminder is not a failed commit");
        assert_eq!(res, RescheduleOutcome::Superseded);

        let stored = test.ctx.repos.reminders.find(&edited.id).await.unwrap();
        assert_eq!(stored.next_run_at, evening);
        assert_eq!(
            stored.next_run_at,
            stored
                .schedule
                .next_run_at(&Tz::UTC, default_now())
                .unwrap()
        );
    }

    #[actix_web::test]
    async fn leaves_deleted_reminder_alone() {
        let test = setup();
        let user = insert_user(&test.ctx, None).await;
        let reminder = insert_reminder(&test.ctx, &user.id, "Aspirin", at(15, 9)).await;
        test.ctx.repos.reminders.delete(&reminder.id).await.unwrap();

        let res = RescheduleReminderUseCase {
            reminder: reminder.clone(),
            now: default_now(),
        }
        .execute(&test.ctx)
        .await
        .unwrap();
        assert_eq!(res, RescheduleOutcome::Superseded);
        assert!(test.ctx.repos.reminders.find(&reminder.id).await.is_none());
    }

    #[actix_web::test]
    async fn leaves_reminder_due_when_store_fails() {
        let test = setup();
        let user = insert_user(&test.ctx, None).await;
        let reminder = insert_reminder(&test.ctx, &user.id, "Aspirin", at(15, 9)).await;
        test.reminders.fail_updates.store(true, Ordering::SeqCst);

        let res = RescheduleReminderUseCase {
            reminder: reminder.clone(),
            now: default_now(),
        }
        .execute(&test.ctx)
        .await;
        assert!(matches!(res, Err(UseCaseError::StorageError(_))));

        let stored = test.ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(stored.next_run_at, at(15, 9));
        assert!(stored.is_due(default_now()));
    }
}
