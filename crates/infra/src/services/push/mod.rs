mod auth_provider;
mod fcm;

pub use fcm::FcmPushSender;
use pillbox_domain::ReminderNotification;

/// Secondary, best effort notification channel
#[async_trait::async_trait]
pub trait IPushSender: Send + Sync {
    async fn send_reminder(
        &self,
        push_token: &str,
        notification: &ReminderNotification,
    ) -> anyhow::Result<()>;
}

/// Used when push notifications are not configured
pub struct DisabledPushSender {}

#[async_trait::async_trait]
impl IPushSender for DisabledPushSender {
    async fn send_reminder(
        &self,
        _push_token: &str,
        _notification: &ReminderNotification,
    ) -> anyhow::Result<()> {
        Err(anyhow::Error::msg("Push notifications are disabled"))
    }
}
