use crate::domain::models::notification::NotificationKind;
use crate::domain::ports::NotificationSender;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

pub struct HttpNotificationSender {
    client: Client,
    api_url: String,
    api_token: String,
}

impl HttpNotificationSender {
    pub fn new(api_url: String, api_token: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_token,
        }
    }
}

#[derive(Serialize)]
struct NotifyPayload<'a> {
    user_id: &'a str,
    kind: &'static str,
    context: &'a serde_json::Value,
}

#[async_trait]
impl NotificationSender for HttpNotificationSender {
    async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        context: &serde_json::Value,
    ) -> Result<(), AppError> {
        let payload = NotifyPayload {
            user_id,
            kind: kind.as_str(),
            context,
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Notification service connection error: {}", e);
                error!("{}", msg);
                AppError::Upstream(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Notification service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Upstream(msg));
        }

        Ok(())
    }
}
