mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
use pillbox_domain::{Reminder, ID};
pub use postgres::PostgresReminderRepo;

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<Reminder>;
    async fn delete(&self, reminder_id: &ID) -> Option<Reminder>;
    /// Every `Reminder` with `next_run_at` at or before `now`
    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Reminder>>;
    /// Sets `next_run_at` of the stored `Reminder` only if its schedule and
    /// `next_run_at` still match `snapshot`. Returns `false` if it was edited
    /// or deleted since the snapshot was read.
    async fn update_next_run(&self, snapshot: &Reminder, next_run_at: i64)
        -> anyhow::Result<bool>;
}
