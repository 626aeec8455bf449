use crate::config::StorageSettings;
use crate::error::{Result, ToolError};
use async_trait::async_trait;
use opendal::{services, Operator};
use std::time::Duration;

/// Validity of retrieval links handed back to the agent.
pub const PRESIGN_TTL: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>) -> Result<()>;

    /// Time-limited retrieval URL for a previously stored key.
    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}

/// S3 object storage through OpenDAL. Credentials come from the usual AWS
/// environment; one operator is built per bucket.
#[derive(Debug, Clone, Default)]
pub struct OpendalStore {
    settings: StorageSettings,
}

impl OpendalStore {
    pub fn new(settings: StorageSettings) -> Self {
        Self { settings }
    }

    fn operator(&self, bucket: &str) -> Result<Operator> {
        let mut builder = services::S3::default().bucket(bucket);

        if let Some(ref region) = self.settings.region {
            builder = builder.region(region);
        }

        if let Some(ref endpoint) = self.settings.endpoint {
            builder = builder.endpoint(endpoint);
        }

        Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| ToolError::Storage(format!("failed to open bucket {}: {}", bucket, e)))
    }
}

#[async_trait]
impl ObjectStore for OpendalStore {
    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>) -> Result<()> {
        tracing::debug!(bucket = %bucket, key = %key, size = content.len(), "Uploading object");

        self.operator(bucket)?.write(key, content).await?;

        tracing::debug!(bucket = %bucket, key = %key, "Upload complete");
        Ok(())
    }

    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let request = self.operator(bucket)?.presign_read(key, expires_in).await?;
        Ok(request.uri().to_string())
    }
}
