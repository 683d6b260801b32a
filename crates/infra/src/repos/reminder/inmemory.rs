use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use pillbox_domain::{Reminder, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        if !save(reminder, &self.reminders) {
            return Err(anyhow::Error::msg(format!(
                "Reminder with id: {} was not found",
                reminder.id
            )));
        }
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Reminder> {
        find_by(&self.reminders, |r| r.user_id == *user_id)
    }

    async fn delete(&self, reminder_id: &ID) -> Option<Reminder> {
        delete(reminder_id, &self.reminders)
    }

    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |r| r.is_due(now)))
    }

    async fn update_next_run(
        &self,
        snapshot: &Reminder,
        next_run_at: i64,
    ) -> anyhow::Result<bool> {
        let mut updated = false;
        update(&snapshot.id, &self.reminders, |r| {
            if r.next_run_at == snapshot.next_run_at && r.schedule == snapshot.schedule {
                r.next_run_at = next_run_at;
                updated = true;
            }
        });
        Ok(updated)
    }
}
