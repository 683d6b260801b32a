use crate::{APIResponse, BaseClient};
use pillbox_api_structs::*;
use pillbox_domain::ID;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

pub struct CreateReminderInput {
    pub user_id: ID,
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
    /// Wall clock time formatted as `HH:MM`
    pub time_of_day: String,
    /// One of `Daily`, `Weekly` or `Monthly`
    pub frequency: String,
    /// Formatted as `YYYY-MM-DD`, defaults to today
    pub start_date: Option<String>,
    /// Precomputed first occurrence, in millis
    pub next_run_at: Option<i64>,
}

pub struct UpdateReminderInput {
    pub reminder_id: ID,
    pub medicine: String,
    pub dosage: String,
    pub notes: Option<String>,
    pub time_of_day: String,
    pub frequency: String,
    pub start_date: Option<String>,
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(
        &self,
        input: CreateReminderInput,
    ) -> APIResponse<create_reminder::APIResponse> {
        let body = create_reminder::RequestBody {
            user_id: input.user_id,
            medicine: input.medicine,
            dosage: input.dosage,
            notes: input.notes,
            time_of_day: input.time_of_day,
            frequency: input.frequency,
            start_date: input.start_date,
            next_run_at: input.next_run_at,
        };

        self.base
            .post(body, "reminder".into(), StatusCode::CREATED)
            .await
    }

    pub async fn get(&self, reminder_id: &ID) -> APIResponse<get_reminder::APIResponse> {
        self.base
            .get(format!("reminder/{}", reminder_id), StatusCode::OK)
            .await
    }

    pub async fn get_by_user(
        &self,
        user_id: &ID,
    ) -> APIResponse<get_user_reminders::APIResponse> {
        self.base
            .get(format!("user/{}/reminders", user_id), StatusCode::OK)
            .await
    }

    pub async fn update(
        &self,
        input: UpdateReminderInput,
    ) -> APIResponse<update_reminder::APIResponse> {
        let body = update_reminder::RequestBody {
            medicine: input.medicine,
            dosage: input.dosage,
            notes: input.notes,
            time_of_day: input.time_of_day,
            frequency: input.frequency,
            start_date: input.start_date,
        };

        self.base
            .put(
                body,
                format!("reminder/{}", input.reminder_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(&self, reminder_id: &ID) -> APIResponse<delete_reminder::APIResponse> {
        self.base
            .delete(format!("reminder/{}", reminder_id), StatusCode::OK)
            .await
    }
}
