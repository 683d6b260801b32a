use crate::shared::usecase::UseCase;
use pillbox_domain::Reminder;
use pillbox_infra::PillboxContext;
use tokio::time::timeout;

/// Takes a snapshot of every `Reminder` that is due at `now`
#[derive(Debug)]
pub struct ScanDueRemindersUseCase {
    pub now: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(anyhow::Error),
    StorageTimeout,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ScanDueRemindersUseCase {
    type Response = Vec<Reminder>;
    type Error = UseCaseError;

    const NAME: &'static str = "ScanDueReminders";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        match timeout(
            ctx.config.reminder_store_timeout,
            ctx.repos.reminders.find_due(self.now),
        )
        .await
        {
            Ok(Ok(reminders)) => Ok(reminders),
            Ok(Err(e)) => Err(UseCaseError::StorageError(e)),
            Err(_) => Err(UseCaseError::StorageTimeout),
        }
    }
}
