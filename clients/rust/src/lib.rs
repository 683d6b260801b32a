mod base;
mod reminder;
mod status;
mod user;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use reminder::ReminderClient;
pub use reminder::{CreateReminderInput, UpdateReminderInput};
use status::StatusClient;
use std::sync::Arc;
use user::UserClient;
pub use user::CreateUserInput;

pub use pillbox_api_structs::dtos::ReminderDTO as Reminder;
pub use pillbox_api_structs::dtos::UserDTO as User;
pub use pillbox_domain::{Frequency, TimeOfDay, ID};
pub use reqwest::StatusCode;

/// Pillbox Scheduler Server SDK
///
/// The SDK contains methods for interacting with the Pillbox Scheduler
/// server API.
#[derive(Clone)]
pub struct PillboxSDK {
    pub reminder: ReminderClient,
    pub status: StatusClient,
    pub user: UserClient,
}

impl PillboxSDK {
    pub fn new(address: String) -> Self {
        let base = Arc::new(BaseClient::new(address));
        let reminder = ReminderClient::new(base.clone());
        let status = StatusClient::new(base.clone());
        let user = UserClient::new(base);

        Self {
            reminder,
            status,
            user,
        }
    }
}
