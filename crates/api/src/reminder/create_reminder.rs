use super::parse_schedule;
use crate::error::PillboxError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use pillbox_api_structs::create_reminder::*;
use pillbox_domain::{Reminder, ReminderContent, ID};
use pillbox_infra::PillboxContext;

pub async fn create_reminder_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<PillboxContext>,
) -> Result<HttpResponse, PillboxError> {
    let body = body.0;
    let usecase = CreateReminderUseCase {
        user_id: body.user_id,
        medicine: body.medicine,
        dosage: body.dosage,
        notes: body.notes,
        time_of_day: body.time_of_day,
        frequency: body.frequency,
        start_date: body.start_date,
        next_run_at: body.next_run_at,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Created().json(APIResponse::new(reminder)))
        .map_err(PillboxError::from)
}

#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub user_id: ID,
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub time_of_day: String,
    pub frequency: String,
    pub start_date: Option<String>,
    pub next_run_at: Option<i64>,
}

#[derive(Debug)]
pub enum UseCaseError {
    UserNotFound(ID),
    InvalidContent(String),
    InvalidSchedule(String),
    InvalidNextRunAt(i64),
    StorageError,
}

impl From<UseCaseError> for PillboxError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
            UseCaseError::InvalidContent(msg) | UseCaseError::InvalidSchedule(msg) => {
                Self::BadClientData(msg)
            }
            UseCaseError::InvalidNextRunAt(ts) => Self::BadClientData(format!(
                "nextRunAt: {} is not an upcoming occurrence of the schedule",
                ts
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        if ctx.repos.users.find(&self.user_id).await.is_none() {
            return Err(UseCaseError::UserNotFound(self.user_id.clone()));
        }

        let content = ReminderContent::new(&self.medicine, &self.dosage, self.notes.as_deref())
            .map_err(|e| UseCaseError::InvalidContent(e.to_string()))?;

        let tz = ctx.config.timezone;
        let now = ctx.sys.get_timestamp_millis();
        let schedule = parse_schedule(
            &self.time_of_day,
            &self.frequency,
            self.start_date.as_deref(),
            &tz,
            now,
        )
        .map_err(UseCaseError::InvalidSchedule)?;

        let next_run_at = match self.next_run_at {
            // A supplied value is only kept if it is an occurrence that has not passed
            Some(ts) => match schedule.next_run_at(&tz, ts) {
                Ok(occurrence) if occurrence == ts && ts >= now => ts,
                _ => return Err(UseCaseError::InvalidNextRunAt(ts)),
            },
            None => schedule
                .next_run_at(&tz, now)
                .map_err(|e| UseCaseError::InvalidSchedule(e.to_string()))?,
        };

        let reminder = Reminder::new(self.user_id.clone(), content, schedule, next_run_at, now);

        ctx.repos
            .reminders
            .insert(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }
}
