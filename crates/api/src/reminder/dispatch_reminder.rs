use crate::shared::usecase::UseCase;
use futures::FutureExt;
use pillbox_domain::{Contact, Reminder, ReminderNotification};
use pillbox_infra::PillboxContext;
use std::{convert::Infallible, future::Future, panic::AssertUnwindSafe, time::Duration};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Notifies the owner of a due `Reminder` on every channel. Channel failures
/// are logged and reported in the result, they never fail the use case.
#[derive(Debug)]
pub struct DispatchReminderUseCase {
    pub reminder: Reminder,
    pub contact: Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Email was accepted by the mail server
    pub primary_ok: bool,
    /// Push notification was accepted by the push provider
    pub secondary_ok: bool,
}

#[derive(Error, Debug)]
enum ChannelError {
    #[error("send failed: {0:?}")]
    Failed(anyhow::Error),
    #[error("send timed out after {0:?}")]
    TimedOut(Duration),
    #[error("sender panicked")]
    Panicked,
}

/// Runs a single channel send so that neither a hanging provider nor a
/// panicking client can escape it
async fn guarded_send<F>(send: F, limit: Duration) -> Result<(), ChannelError>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match timeout(limit, AssertUnwindSafe(send).catch_unwind()).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => Err(ChannelError::Failed(e)),
        Ok(Err(_)) => Err(ChannelError::Panicked),
        Err(_) => Err(ChannelError::TimedOut(limit)),
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DispatchReminderUseCase {
    type Response = DispatchResult;
    type Error = Infallible;

    const NAME: &'static str = "DispatchReminder";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        let notification = ReminderNotification::new(&self.reminder, &self.contact);
        let limit = ctx.config.notification_channel_timeout;
        let reminder_id = &self.reminder.id;

        let email = async {
            match guarded_send(
                ctx.notifications
                    .email
                    .send_reminder(&self.contact, &notification),
                limit,
            )
            .await
            {
                Ok(()) => true,
                Err(e) => {
                    error!(
                        "Reminder: {} could not be delivered on channel: email. Error: {}",
                        reminder_id, e
                    );
                    false
                }
            }
        };

        let push = async {
            let token = match &self.contact.push_token {
                Some(token) => token,
                None => {
                    debug!(
                        "Owner of reminder: {} has no push token, skipping channel: push",
                        reminder_id
                    );
                    return false;
                }
            };
            match guarded_send(
                ctx.notifications.push.send_reminder(token, &notification),
                limit,
            )
            .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Reminder: {} could not be delivered on channel: push. Error: {}",
                        reminder_id, e
                    );
                    false
                }
            }
        };

        let (primary_ok, secondary_ok) = futures::join!(email, push);

        Ok(DispatchResult {
            primary_ok,
            secondary_ok,
        })
    }
}
