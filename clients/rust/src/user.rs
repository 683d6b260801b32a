use crate::{APIResponse, BaseClient};
use pillbox_api_structs::*;
use pillbox_domain::ID;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserClient {
    base: Arc<BaseClient>,
}

pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
}

impl UserClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateUserInput) -> APIResponse<create_user::APIResponse> {
        let body = create_user::RequestBody {
            name: input.name,
            email: input.email,
            push_token: input.push_token,
        };

        self.base
            .post(body, "user".into(), StatusCode::CREATED)
            .await
    }

    pub async fn get(&self, user_id: &ID) -> APIResponse<get_user::APIResponse> {
        self.base
            .get(format!("user/{}", user_id), StatusCode::OK)
            .await
    }

    /// Pass `None` to unregister the device of the user
    pub async fn update_push_token(
        &self,
        user_id: &ID,
        push_token: Option<String>,
    ) -> APIResponse<update_push_token::APIResponse> {
        let body = update_push_token::RequestBody { push_token };
        self.base
            .put(body, format!("user/{}/push-token", user_id), StatusCode::OK)
            .await
    }

    pub async fn delete(&self, user_id: &ID) -> APIResponse<delete_user::APIResponse> {
        self.base
            .delete(format!("user/{}", user_id), StatusCode::OK)
            .await
    }
}
