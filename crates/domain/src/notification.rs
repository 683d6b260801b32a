use crate::{reminder::Reminder, user::Contact};

/// The content sent to a `User` when a `Reminder` is due, shared by
/// every notification channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderNotification {
    pub display_name: String,
    pub medicine: String,
    pub dosage: String,
    /// Scheduled time formatted on a 12 hour clock
    pub time: String,
}

impl ReminderNotification {
    pub fn new(reminder: &Reminder, contact: &Contact) -> Self {
        Self {
            display_name: contact.display_name.clone(),
            medicine: reminder.medicine.clone(),
            dosage: reminder.dosage.clone(),
            time: reminder.schedule.time_of_day.to_12_hour_string(),
        }
    }

    pub fn email_subject(&self) -> String {
        format!(
            "Medication Reminder: {} for {}",
            self.medicine, self.display_name
        )
    }

    /// Key value payload for data messages sent to devices
    pub fn push_data(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.display_name.clone()),
            ("medicine", self.medicine.clone()),
            ("dosage", self.dosage.clone()),
            ("time", self.time.clone()),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Frequency, ReminderContent, ReminderSchedule, ID};
    use chrono::NaiveDate;

    fn notification() -> ReminderNotification {
        let schedule = ReminderSchedule {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            time_of_day: "21:05".parse().unwrap(),
            frequency: Frequency::Daily,
        };
        let content = ReminderContent::new("Cod <liver> oil", "1 spoon", None).unwrap();
        let reminder = Reminder::new(ID::new(), content, schedule, 0, 0);
        let contact = Contact {
            display_name: "Jane".into(),
            email: "jane@example.com".into(),
            push_token: None,
        };
        ReminderNotification::new(&reminder, &contact)
    }

    #[test]
    fn formats_notification() {
        let n = notification();
        assert_eq!(n.time, "09:05 PM");
        assert_eq!(n.email_subject(), "Medication Reminder: Cod <liver> oil for Jane");
        assert_eq!(n.push_data()[1], ("medicine", "Cod <liver> oil".to_string()));
    }
}
