use chrono::NaiveDate;
use pillbox_domain::{Frequency, Reminder, TimeOfDay, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: ID,
    pub user_id: ID,
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub start_date: NaiveDate,
    pub time_of_day: TimeOfDay,
    pub frequency: Frequency,
    pub next_run_at: i64,
    pub created: i64,
    pub updated: i64,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            user_id: reminder.user_id,
            medicine: reminder.medicine,
            dosage: reminder.dosage,
            notes: reminder.notes,
            start_date: reminder.schedule.start_date,
            time_of_day: reminder.schedule.time_of_day,
            frequency: reminder.schedule.frequency,
            next_run_at: reminder.next_run_at,
            created: reminder.created,
            updated: reminder.updated,
        }
    }
}
