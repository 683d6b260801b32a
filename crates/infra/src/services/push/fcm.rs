use super::{
    auth_provider::{ServiceAccountAuth, ServiceAccountKey},
    IPushSender,
};
use pillbox_domain::ReminderNotification;
use serde::Serialize;
use std::collections::HashMap;

// https://firebase.google.com/docs/reference/fcm/rest/v1/projects.messages/send

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    message: DataMessage<'a>,
}

#[derive(Debug, Serialize)]
struct DataMessage<'a> {
    token: &'a str,
    data: HashMap<&'static str, String>,
}

/// Sends data messages to devices through Firebase Cloud Messaging
pub struct FcmPushSender {
    client: reqwest::Client,
    send_endpoint: String,
    auth: ServiceAccountAuth,
}

impl FcmPushSender {
    pub fn new(service_account_json: &str) -> anyhow::Result<Self> {
        let key = ServiceAccountKey::from_json(service_account_json)?;
        let client = reqwest::Client::new();
        let send_endpoint = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            key.project_id
        );
        Ok(Self {
            auth: ServiceAccountAuth::new(key, client.clone())?,
            client,
            send_endpoint,
        })
    }
}

#[async_trait::async_trait]
impl IPushSender for FcmPushSender {
    async fn send_reminder(
        &self,
        push_token: &str,
        notification: &ReminderNotification,
    ) -> anyhow::Result<()> {
        let access_token = self.auth.get_access_token().await?;
        let body = SendMessageRequest {
            message: DataMessage {
                token: push_token,
                data: notification.push_data().into_iter().collect(),
            },
        };

        let res = self
            .client
            .post(&self.send_endpoint)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::Error::msg(format!(
                "FCM send failed with status {}: {}",
                status, text
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_data_message() {
        let notification = ReminderNotification {
            display_name: "Jane".into(),
            medicine: "Aspirin".into(),
            dosage: "1 tablet".into(),
            time: "09:00 AM".into(),
        };
        let body = SendMessageRequest {
            message: DataMessage {
                token: "device-token",
                data: notification.push_data().into_iter().collect(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"]["token"], "device-token");
        assert_eq!(json["message"]["data"]["name"], "Jane");
        assert_eq!(json["message"]["data"]["medicine"], "Aspirin");
        assert_eq!(json["message"]["data"]["dosage"], "1 tablet");
        assert_eq!(json["message"]["data"]["time"], "09:00 AM");
    }

    #[test]
    fn rejects_invalid_service_account() {
        assert!(FcmPushSender::new("{}").is_err());
    }
}
