use super::IReminderRepo;
use chrono::NaiveDate;
use pillbox_domain::{Reminder, ReminderSchedule, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::{error, warn};

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    user_uid: Uuid,
    medicine: String,
    dosage: String,
    notes: Option<String>,
    start_date: NaiveDate,
    time_of_day: String,
    frequency: String,
    next_run_at: i64,
    created: i64,
    updated: i64,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(e: ReminderRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: e.reminder_uid.into(),
            user_id: e.user_uid.into(),
            medicine: e.medicine,
            dosage: e.dosage,
            notes: e.notes,
            schedule: ReminderSchedule {
                start_date: e.start_date,
                time_of_day: e.time_of_day.parse()?,
                frequency: e.frequency.parse()?,
            },
            next_run_at: e.next_run_at,
            created: e.created,
            updated: e.updated,
        })
    }
}

/// Rows that cannot be converted are logged and left out so that one
/// corrupt record does not hide the rest
fn into_reminders(rows: Vec<ReminderRaw>) -> Vec<Reminder> {
    rows.into_iter()
        .filter_map(|raw| {
            let reminder_uid = raw.reminder_uid;
            match Reminder::try_from(raw) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    warn!("Skipping malformed reminder {}: {:?}", reminder_uid, e);
                    None
                }
            }
        })
        .collect()
}

const SELECT_REMINDER: &str = r#"
    SELECT reminder_uid, user_uid, medicine, dosage, notes, start_date,
        time_of_day, frequency, next_run_at, created, updated
    FROM reminders
"#;

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders(reminder_uid, user_uid, medicine, dosage, notes,
                start_date, time_of_day, frequency, next_run_at, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.user_id.inner_ref())
        .bind(&reminder.medicine)
        .bind(&reminder.dosage)
        .bind(&reminder.notes)
        .bind(reminder.schedule.start_date)
        .bind(reminder.schedule.time_of_day.to_string())
        .bind(reminder.schedule.frequency.to_string())
        .bind(reminder.next_run_at)
        .bind(reminder.created)
        .bind(reminder.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let rows = sqlx::query(
            r#"
            UPDATE reminders
            SET medicine = $2,
            dosage = $3,
            notes = $4,
            start_date = $5,
            time_of_day = $6,
            frequency = $7,
            next_run_at = $8,
            updated = $9
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(&reminder.medicine)
        .bind(&reminder.dosage)
        .bind(&reminder.notes)
        .bind(reminder.schedule.start_date)
        .bind(reminder.schedule.time_of_day.to_string())
        .bind(reminder.schedule.frequency.to_string())
        .bind(reminder.next_run_at)
        .bind(reminder.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to update reminder: {:?}", e);
            e
        })?
        .rows_affected();

        if rows == 0 {
            return Err(anyhow::Error::msg(format!(
                "Reminder with id: {} was not found",
                reminder.id
            )));
        }
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        let raw: ReminderRaw =
            match sqlx::query_as(&format!("{} WHERE reminder_uid = $1", SELECT_REMINDER))
                .bind(reminder_id.inner_ref())
                .fetch_one(&self.pool)
                .await
            {
                Ok(raw) => raw,
                Err(_) => return None,
            };
        into_reminders(vec![raw]).pop()
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Reminder> {
        let rows: Vec<ReminderRaw> = sqlx::query_as(&format!(
            "{} WHERE user_uid = $1 ORDER BY created",
            SELECT_REMINDER
        ))
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();

        into_reminders(rows)
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        let raw: ReminderRaw = sqlx::query_as(
            r#"
            DELETE FROM reminders
            WHERE reminder_uid = $1
            RETURNING reminder_uid, user_uid, medicine, dosage, notes, start_date,
                time_of_day, frequency, next_run_at, created, updated
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_one(&self.pool)
        .await
        .ok()?;

        into_reminders(vec![raw]).pop()
    }

    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Reminder>> {
        let rows: Vec<ReminderRaw> =
            sqlx::query_as(&format!("{} WHERE next_run_at <= $1", SELECT_REMINDER))
                .bind(now)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Unable to query due reminders: {:?}", e);
                    e
                })?;

        Ok(into_reminders(rows))
    }

    async fn update_next_run(
        &self,
        snapshot: &Reminder,
        next_run_at: i64,
    ) -> anyhow::Result<bool> {
        let rows = sqlx::query(
            r#"
            UPDATE reminders
            SET next_run_at = $2
            WHERE reminder_uid = $1
            AND next_run_at = $3
            AND start_date = $4
            AND time_of_day = $5
            AND frequency = $6
            "#,
        )
        .bind(snapshot.id.inner_ref())
        .bind(next_run_at)
        .bind(snapshot.next_run_at)
        .bind(snapshot.schedule.start_date)
        .bind(snapshot.schedule.time_of_day.to_string())
        .bind(snapshot.schedule.frequency.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }
}
