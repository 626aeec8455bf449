use crate::config::NotificationSettings;
use crate::error::{Result, ToolError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub topic: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a notification and return the message identifier.
    async fn publish(&self, notification: &Notification) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    #[serde(alias = "MessageId", alias = "messageId")]
    message_id: Option<String>,
}

/// Publishes notifications through an HTTP gateway in front of the topic.
pub struct HttpNotifier {
    http: Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(settings: &NotificationSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn publish(&self, notification: &Notification) -> Result<String> {
        tracing::debug!(topic = %notification.topic, endpoint = %self.endpoint, "Publishing notification");

        let response = self
            .http
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await?
            .error_for_status()?
            .json::<PublishResponse>()
            .await?;

        response
            .message_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ToolError::Notification("publish response carried no message id".into()))
    }
}
