use super::{Operation, CREATE_PPTX};
use crate::collaborators::{ObjectStore, PRESIGN_TTL};
use crate::config::{required, Settings, STORAGE_BUCKET_ENV};
use crate::deck::{DeckRenderer, SlideDeck};
use crate::dispatch::{Parameters, Payload};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use std::sync::Arc;

/// Object key for a deck created at `now`.
pub fn object_key<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("slide_{}.pptx", now.format("%Y%m%d_%H%M%S"))
}

/// Builds a deck from free text, stores it and returns a time-limited link.
pub struct CreatePptx {
    bucket: Option<String>,
    store: Arc<dyn ObjectStore>,
    renderer: Arc<dyn DeckRenderer>,
}

impl CreatePptx {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn ObjectStore>,
        renderer: Arc<dyn DeckRenderer>,
    ) -> Self {
        Self {
            bucket: settings.storage_bucket.clone(),
            store,
            renderer,
        }
    }
}

#[async_trait]
impl Operation for CreatePptx {
    fn name(&self) -> &'static str {
        CREATE_PPTX
    }

    async fn invoke(&self, params: &Parameters) -> Result<Payload> {
        let bucket = required(&self.bucket, STORAGE_BUCKET_ENV)?;
        let title = params.get_or("title", "Untitled");
        let content = params.get_or("content", "");

        let now = Local::now();
        let deck = SlideDeck::plan(title, content, now.date_naive());
        let bytes = self.renderer.render(&deck)?;

        let key = object_key(&now);
        tracing::info!(
            bucket = %bucket,
            key = %key,
            slides = deck.slide_count(),
            "Storing presentation"
        );

        self.store.put(bucket, &key, bytes).await?;
        let download_url = self.store.presign_get(bucket, &key, PRESIGN_TTL).await?;

        let mut payload = Payload::new();
        payload.insert(
            "message".into(),
            Value::String("PowerPoint created successfully".into()),
        );
        payload.insert("s3_key".into(), Value::String(key));
        payload.insert("download_url".into(), Value::String(download_url));
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_object_key_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(object_key(&at), "slide_20260304_050607.pptx");
    }
}
