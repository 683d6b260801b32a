use crate::error::PillboxError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use lettre::Address;
use pillbox_api_structs::create_user::*;
use pillbox_domain::User;
use pillbox_infra::PillboxContext;

pub async fn create_user_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<PillboxContext>,
) -> Result<HttpResponse, PillboxError> {
    let body = body.0;
    let usecase = CreateUserUseCase {
        name: body.name,
        email: body.email,
        push_token: body.push_token,
    };

    execute(usecase, &ctx)
        .await
        .map(|user| HttpResponse::Created().json(APIResponse::new(user)))
        .map_err(PillboxError::from)
}

#[derive(Debug)]
pub struct CreateUserUseCase {
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidEmail(String),
    StorageError,
}

impl From<UseCaseError> for PillboxError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidEmail(email) => {
                Self::BadClientData(format!("Email: {} is not a valid email address", email))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateUserUseCase {
    type Response = User;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateUser";

    async fn execute(&mut self, ctx: &PillboxContext) -> Result<Self::Response, Self::Error> {
        // Same rule the mailer applies when the reminder is sent
        let email = self
            .email
            .trim()
            .parse::<Address>()
            .map_err(|_| UseCaseError::InvalidEmail(self.email.clone()))?;
        let push_token = self
            .push_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        let user = User::new(
            self.name.trim().to_string(),
            email.to_string(),
            push_token,
            ctx.sys.get_timestamp_millis(),
        );

        ctx.repos
            .users
            .insert(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(user)
    }
}
