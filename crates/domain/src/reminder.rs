use crate::shared::{
    entity::{Entity, ID},
    recurrence::{compute_next_run, compute_next_run_after, Frequency, RecurrenceError, TimeOfDay},
};
use chrono::prelude::*;
use chrono_tz::Tz;
use thiserror::Error;

pub const MEDICINE_MAX_LEN: usize = 50;
pub const DOSAGE_MAX_LEN: usize = 20;
pub const NOTES_MAX_LEN: usize = 100;

/// When and how often the owner of a `Reminder` should be notified
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSchedule {
    /// Calendar date the schedule is anchored to
    pub start_date: NaiveDate,
    pub time_of_day: TimeOfDay,
    pub frequency: Frequency,
}

impl ReminderSchedule {
    /// Timestamp of the very first occurrence
    pub fn anchor(&self, tz: &Tz) -> Result<i64, RecurrenceError> {
        let start_of_anchor_day = tz
            .from_local_datetime(&self.start_date.and_time(NaiveTime::MIN))
            .earliest()
            .ok_or(RecurrenceError::OutOfRange)?
            .timestamp_millis();
        compute_next_run(
            self.start_date,
            self.time_of_day,
            self.frequency,
            tz,
            start_of_anchor_day,
        )
    }

    /// First occurrence at or after `reference`
    pub fn next_run_at(&self, tz: &Tz, reference: i64) -> Result<i64, RecurrenceError> {
        compute_next_run(self.start_date, self.time_of_day, self.frequency, tz, reference)
    }

    /// First occurrence strictly after `reference`
    pub fn next_run_after(&self, tz: &Tz, reference: i64) -> Result<i64, RecurrenceError> {
        compute_next_run_after(self.start_date, self.time_of_day, self.frequency, tz, reference)
    }
}

/// A `Reminder` is a recurring medication intake for which the owning `User`
/// should be notified at every occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The `User` that should be notified
    pub user_id: ID,
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub schedule: ReminderSchedule,
    /// Timestamp in millis of the next time the `User` should be notified.
    /// A `Reminder` is due when this is at or before the current time.
    pub next_run_at: i64,
    pub created: i64,
    pub updated: i64,
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidReminderError {
    #[error("Medicine name is required and can be at most {} characters", MEDICINE_MAX_LEN)]
    Medicine,
    #[error("Dosage is required and can be at most {} characters", DOSAGE_MAX_LEN)]
    Dosage,
    #[error("Notes can be at most {} characters", NOTES_MAX_LEN)]
    Notes,
}

/// The user provided content of a `Reminder`, trimmed and validated
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderContent {
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
}

impl ReminderContent {
    pub fn new(
        medicine: &str,
        dosage: &str,
        notes: Option<&str>,
    ) -> Result<Self, InvalidReminderError> {
        let medicine = medicine.trim();
        if medicine.is_empty() || medicine.chars().count() > MEDICINE_MAX_LEN {
            return Err(InvalidReminderError::Medicine);
        }
        let dosage = dosage.trim();
        if dosage.is_empty() || dosage.chars().count() > DOSAGE_MAX_LEN {
            return Err(InvalidReminderError::Dosage);
        }
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        if let Some(notes) = notes {
            if notes.chars().count() > NOTES_MAX_LEN {
                return Err(InvalidReminderError::Notes);
            }
        }

        Ok(Self {
            medicine: medicine.to_string(),
            dosage: dosage.to_string(),
            notes: notes.map(String::from),
        })
    }
}

impl Reminder {
    pub fn new(
        user_id: ID,
        content: ReminderContent,
        schedule: ReminderSchedule,
        next_run_at: i64,
        now: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            user_id,
            medicine: content.medicine,
            dosage: content.dosage,
            notes: content.notes,
            schedule,
            next_run_at,
            created: now,
            updated: now,
        }
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_run_at <= now
    }

    /// Replaces content and schedule. The next run is always recomputed
    /// from `now` because the old one was derived from the old schedule.
    pub fn update(
        &mut self,
        content: ReminderContent,
        schedule: ReminderSchedule,
        tz: &Tz,
        now: i64,
    ) -> Result<(), RecurrenceError> {
        let next_run_at = schedule.next_run_at(tz, now)?;
        self.medicine = content.medicine;
        self.dosage = content.dosage;
        self.notes = content.notes;
        self.schedule = schedule;
        self.next_run_at = next_run_at;
        self.updated = now;
        Ok(())
    }
}
