use super::parse_schedule;
use crate::error::PillboxError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use pillbox_api_structs::update_reminder::*;
use pillbox_domain::{Reminder, ReminderContent, ID};
use pillbox_infra::PillboxContext;

pub async fn update_reminder_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PillboxContext>,
) -> Result<HttpResponse, PillboxError> {
    let body = body.0;
    let usecase = UpdateReminderUseCase {
        reminder_id: path_params.reminder_id.clone(),
        medicine: body.medicine,
        dosage: body.dosage,
        notes: body.notes,
        time_of_day: body.time_of_day,
        frequency: body.frequency,
        start_date: body.start_date,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(PillboxError::from)
}

/// Replaces content and schedule of a `Reminder`. The next run is always
/// recomputed, a previously stored one belongs to the old schedule.
#[derive(Debug)]
pub struct UpdateReminderUseCase {
    pub reminder_id: ID,
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub time_of_day: String,
    pub frequency: String,
    pub start_date: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidContent(String),
    InvalidSchedule(String),
    StorageError,
}

impl From<UseCaseError> for PillboxError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("A reminder with id: {}, was not found.", id))
            }
            UseCaseError::InvalidContent(msg) | UseCaseError::InvalidSchedule(msg) => {
                Self::BadClientData(msg)
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateReminderUseCase {
    type Response = Reminder;
    type Error = UseCaseError;

    const NAME: &'static str = "UpdateReminder";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        let mut reminder = ctx
            .repos
            .reminders
            .find(&self.reminder_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.reminder_id.clone()))?;

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

        reminder
            .update(content, schedule, &tz, now)
            .map_err(|e| UseCaseError::InvalidSchedule(e.to_string()))?;

        ctx.repos
            .reminders
            .save(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }
}
