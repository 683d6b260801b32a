pub mod date;
mod notification;
mod reminder;
mod shared;
mod user;

pub use notification::ReminderNotification;
pub use reminder::{
    InvalidReminderError, Reminder, ReminderContent, ReminderSchedule, DOSAGE_MAX_LEN,
    MEDICINE_MAX_LEN, NOTES_MAX_LEN,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::recurrence::{
    compute_next_run, compute_next_run_after, Frequency, InvalidFrequencyError,
    InvalidTimeOfDayError, RecurrenceError, TimeOfDay,
};
pub use user::{Contact, User};

pub use chrono::NaiveDate;
pub use chrono_tz::Tz;
