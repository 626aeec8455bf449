use super::{Operation, SEND_EMAIL};
use crate::collaborators::{Notification, Notifier};
use crate::config::{required, Settings, NOTIFICATION_TOPIC_ENV};
use crate::dispatch::{Parameters, Payload};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const EMAIL_SUBJECT: &str = "Your presentation is ready";

pub fn email_message(url: &str) -> String {
    format!(
        "Your presentation can be downloaded from the following URL:\n{}",
        url
    )
}

/// Announces a download link to the configured notification topic.
pub struct SendEmail {
    topic: Option<String>,
    notifier: Arc<dyn Notifier>,
}

impl SendEmail {
    pub fn new(settings: &Settings, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            topic: settings.notification_topic.clone(),
            notifier,
        }
    }
}

#[async_trait]
impl Operation for SendEmail {
    fn name(&self) -> &'static str {
        SEND_EMAIL
    }

    async fn invoke(&self, params: &Parameters) -> Result<Payload> {
        let topic = required(&self.topic, NOTIFICATION_TOPIC_ENV)?;
        let url = params.get_or("url", "");

        let notification = Notification {
            topic: topic.to_string(),
            subject: EMAIL_SUBJECT.to_string(),
            message: email_message(url),
        };
        let message_id = self.notifier.publish(&notification).await?;

        tracing::info!(message_id = %message_id, "Notification published");

        let mut payload = Payload::new();
        payload.insert(
            "message".into(),
            Value::String("Email sent successfully".into()),
        );
        payload.insert("message_id".into(), Value::String(message_id));
        Ok(payload)
    }
}
