use crate::date::{add_months_clamped, months_between};
use chrono::{prelude::*, Days, Duration, LocalResult};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidFrequencyError {
    #[error("Frequency must be Daily, Weekly or Monthly, got: {0}")]
    Unknown(String),
}

impl FromStr for Frequency {
    type Err = InvalidFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(InvalidFrequencyError::Unknown(s.to_string())),
        }
    }
}

/// Wall clock time of day with minute precision, e.g. `09:30`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// 12 hour clock label used in notifications, e.g. `09:00 PM`
    pub fn to_12_hour_string(&self) -> String {
        let (hour, period) = match self.hour {
            0 => (12, "AM"),
            h if h < 12 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{:02}:{:02} {}", hour, self.minute, period)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeOfDayError {
    #[error("Time of day must be in 24 hour HH:MM format, got: {0}")]
    Malformed(String),
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let e = || InvalidTimeOfDayError::Malformed(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(e)?;
        let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
        if !all_digits(hour) || !all_digits(minute) || hour.len() > 2 || minute.len() != 2 {
            return Err(e());
        }
        let hour = hour.parse::<u32>().map_err(|_| e())?;
        let minute = minute.parse::<u32>().map_err(|_| e())?;
        Self::new(hour, minute).ok_or_else(e)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A valid HH:MM time of day")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<TimeOfDay>()
                    .map_err(|_| E::custom(format!("Malformed time of day: {}", value)))
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RecurrenceError {
    #[error("The next occurrence is outside of the supported date range")]
    OutOfRange,
    #[error("Local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(NaiveDateTime),
}

fn occurrence_date(start_date: NaiveDate, frequency: Frequency, index: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => start_date.checked_add_days(Days::new(index as u64)),
        Frequency::Weekly => start_date.checked_add_days(Days::new(7 * index as u64)),
        Frequency::Monthly => add_months_clamped(start_date, index),
    }
}

/// Index of an occurrence guaranteed to lie before `reference_date` (or 0)
/// so that the search does not have to step through every past period.
fn first_candidate_index(start_date: NaiveDate, frequency: Frequency, reference_date: NaiveDate) -> u32 {
    let days = reference_date.signed_duration_since(start_date).num_days();
    let index = match frequency {
        Frequency::Daily => days - 2,
        Frequency::Weekly => days / 7 - 1,
        Frequency::Monthly => months_between(start_date, reference_date) - 1,
    };
    index.clamp(0, u32::MAX as i64) as u32
}

fn localize(date: NaiveDate, time_of_day: TimeOfDay, tz: &Tz) -> Result<DateTime<Tz>, RecurrenceError> {
    let naive = date.and_time(time_of_day.as_naive_time());
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        // Skipped by a DST transition, use the same wall clock time one hour later
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or(RecurrenceError::NonexistentLocalTime(naive)),
    }
}

/// Computes the first occurrence of the schedule that is not earlier than
/// `reference` (millis). An occurrence exactly at `reference` is returned.
///
/// Occurrence `k` is `start_date` moved forward by `k` days, weeks or
/// calendar months at `time_of_day` in `tz`. Monthly occurrences are
/// always measured from `start_date` and clamped to the last day of shorter
/// months, so a schedule anchored on the 31st fires on Feb 29, Mar 31, Apr 30 ...
pub fn compute_next_run(
    start_date: NaiveDate,
    time_of_day: TimeOfDay,
    frequency: Frequency,
    tz: &Tz,
    reference: i64,
) -> Result<i64, RecurrenceError> {
    let reference_date = Utc
        .timestamp_millis_opt(reference)
        .single()
        .ok_or(RecurrenceError::OutOfRange)?
        .with_timezone(tz)
        .date_naive();

    let mut index = first_candidate_index(start_date, frequency, reference_date);
    loop {
        let date =
            occurrence_date(start_date, frequency, index).ok_or(RecurrenceError::OutOfRange)?;
        let candidate = localize(date, time_of_day, tz)?.timestamp_millis();
        if candidate >= reference {
            return Ok(candidate);
        }
        index = index.checked_add(1).ok_or(RecurrenceError::OutOfRange)?;
    }
}

/// Same as `compute_next_run` but the returned occurrence is strictly
/// later than `reference`.
pub fn compute_next_run_after(
    start_date: NaiveDate,
    time_of_day: TimeOfDay,
    frequency: Frequency,
    tz: &Tz,
    reference: i64,
) -> Result<i64, RecurrenceError> {
    let reference = reference.checked_add(1).ok_or(RecurrenceError::OutOfRange)?;
    compute_next_run(start_date, time_of_day, frequency, tz, reference)
}
