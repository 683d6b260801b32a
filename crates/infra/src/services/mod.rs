mod email;
mod push;

use crate::Config;
pub use email::{IEmailSender, SmtpEmailSender, UnconfiguredEmailSender};
pub use push::{DisabledPushSender, FcmPushSender, IPushSender};
use std::sync::Arc;
use tracing::error;

/// The channels a due `Reminder` is delivered through
#[derive(Clone)]
pub struct Notifications {
    pub email: Arc<dyn IEmailSender>,
    pub push: Arc<dyn IPushSender>,
}

impl Notifications {
    /// Builds the channel clients once at startup. A channel with missing or
    /// invalid settings is replaced by one that reports every send as failed.
    pub fn from_config(config: &Config) -> Self {
        let email: Arc<dyn IEmailSender> = match &config.email {
            Some(settings) => match SmtpEmailSender::new(settings) {
                Ok(sender) => Arc::new(sender),
                Err(e) => {
                    error!("Unable to create SMTP email sender: {:?}", e);
                    Arc::new(UnconfiguredEmailSender {})
                }
            },
            None => Arc::new(UnconfiguredEmailSender {}),
        };

        let push: Arc<dyn IPushSender> = match &config.firebase_service_account {
            Some(service_account) => match FcmPushSender::new(service_account) {
                Ok(sender) => Arc::new(sender),
                Err(e) => {
                    error!("Unable to create firebase push sender: {:?}", e);
                    Arc::new(DisabledPushSender {})
                }
            },
            None => Arc::new(DisabledPushSender {}),
        };

        Self { email, push }
    }
}
