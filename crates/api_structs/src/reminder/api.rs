use crate::dtos::ReminderDTO;
use pillbox_domain::{Reminder, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder),
        }
    }
}

pub mod create_reminder {
    use super::*;

    #[derive(Debug, Deserialize, Serialize, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: ID,
        pub medicine: String,
        pub dosage: String,
        /// 24 hour clock, e.g. "08:30"
        pub time_of_day: String,
        /// One of "Daily", "Weekly" or "Monthly"
        pub frequency: String,
        /// Either a date (YYYY-MM-DD) or a RFC 3339 datetime. Defaults to today.
        #[serde(default)]
        pub start_date: Option<String>,
        #[serde(default)]
        pub notes: Option<String>,
        /// Only used if it is a valid upcoming occurrence of the schedule
        #[serde(default)]
        pub next_run_at: Option<i64>,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod get_reminder {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod get_user_reminders {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<ReminderDTO>,
    }

    impl APIResponse {
        pub fn new(reminders: Vec<Reminder>) -> Self {
            Self {
                reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
            }
        }
    }
}

pub mod update_reminder {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub medicine: String,
        pub dosage: String,
        pub time_of_day: String,
        pub frequency: String,
        #[serde(default)]
        pub start_date: Option<String>,
        #[serde(default)]
        pub notes: Option<String>,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod delete_reminder {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillbox_domain::{Frequency, NaiveDate, ReminderContent, ReminderSchedule};

    #[test]
    fn serializes_reminder_in_camel_case() {
        let schedule = ReminderSchedule {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time_of_day: "8:05".parse().unwrap(),
            frequency: Frequency::Weekly,
        };
        let content = ReminderContent::new("Vitamin D", "1000 IU", None).unwrap();
        let reminder = Reminder::new(ID::default(), content, schedule, 1709280300000, 0);

        let json = serde_json::to_value(ReminderResponse::new(reminder)).unwrap();
        let dto = &json["reminder"];
        assert_eq!(dto["medicine"], "Vitamin D");
        assert_eq!(dto["timeOfDay"], "08:05");
        assert_eq!(dto["frequency"], "Weekly");
        assert_eq!(dto["startDate"], "2024-03-01");
        assert_eq!(dto["nextRunAt"], 1709280300000i64);
        assert!(dto["notes"].is_null());
    }

    #[test]
    fn optional_create_fields_default_to_none() {
        let body: create_reminder::RequestBody = serde_json::from_str(
            r#"{
                "userId": "6e9a2f3c-58f4-4d4c-9b3c-2d9cbd5d1f3a",
                "medicine": "Aspirin",
                "dosage": "1 tablet",
                "timeOfDay": "09:00",
                "frequency": "Daily"
            }"#,
        )
        .unwrap();
        assert!(body.start_date.is_none());
        assert!(body.notes.is_none());
        assert!(body.next_run_at.is_none());
    }
}
