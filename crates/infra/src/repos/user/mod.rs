mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
use pillbox_domain::{Contact, User, ID};
pub use postgres::PostgresUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn delete(&self, user_id: &ID) -> Option<User>;

    /// Looks up where to deliver notifications for the given `User`.
    /// `Ok(None)` means the `User` does not exist, a failed lookup is an `Err`.
    async fn resolve_contact(&self, user_id: &ID) -> anyhow::Result<Option<Contact>> {
        Ok(self.find(user_id).await.map(|user| user.contact()))
    }
}
