use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

pub const SEARCH_API_KEY_ENV: &str = "TAVILY_API_KEY";
pub const STORAGE_BUCKET_ENV: &str = "S3_BUCKET";
pub const NOTIFICATION_TOPIC_ENV: &str = "SNS_TOPIC_ARN";
pub const REGION_ENV: &str = "AWS_REGION";

/// Runtime settings for the tool backend.
///
/// The three top-level options are the settings each operation requires.
/// They stay optional here: an absent value is reported by the operation that
/// needs it, as an error result, never at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_api_key: Option<String>,
    pub storage_bucket: Option<String>,
    pub notification_topic: Option<String>,
    pub search: SearchSettings,
    pub storage: StorageSettings,
    pub notification: NotificationSettings,
    pub knowledge: KnowledgeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787/publish".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    pub endpoint: String,
    pub model_arn: String,
    pub max_query_chars: usize,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787/retrieve-and-generate".to_string(),
            model_arn: "jp.anthropic.claude-sonnet-4-5-20250929-v1:0".to_string(),
            max_query_chars: 4000,
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file, then apply environment overrides.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let content = fs::read_to_string(path).await?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(value) = get(SEARCH_API_KEY_ENV) {
            self.search_api_key = Some(value);
        }
        if let Some(value) = get(STORAGE_BUCKET_ENV) {
            self.storage_bucket = Some(value);
        }
        if let Some(value) = get(NOTIFICATION_TOPIC_ENV) {
            self.notification_topic = Some(value);
        }
        if let Some(value) = get(REGION_ENV) {
            self.storage.region = Some(value);
        }
    }
}

/// Returns the value of a required setting, treating an empty string as absent.
pub fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(crate::error::ToolError::MissingConfig(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.search_api_key.is_none());
        assert_eq!(settings.search.max_results, 5);
        assert_eq!(settings.search.timeout_secs, 30);
        assert_eq!(settings.search.endpoint, "https://api.tavily.com/search");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            storage_bucket = "decks"

            [search]
            max_results = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.storage_bucket.as_deref(), Some("decks"));
        assert_eq!(settings.search.max_results, 3);
        assert_eq!(settings.search.timeout_secs, 30);
        assert!(settings.notification_topic.is_none());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Settings::from_toml("search = 12").unwrap_err();
        assert!(matches!(err, ToolError::InvalidConfig(_)));
    }

    #[test]
    fn test_env_overrides_and_ignores_empty_values() {
        let env: HashMap<&str, &str> = [
            (SEARCH_API_KEY_ENV, "tvly-123"),
            (STORAGE_BUCKET_ENV, ""),
            (REGION_ENV, "ap-northeast-1"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings {
            storage_bucket: Some("from-file".to_string()),
            ..Settings::default()
        };
        settings.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.search_api_key.as_deref(), Some("tvly-123"));
        assert_eq!(settings.storage_bucket.as_deref(), Some("from-file"));
        assert_eq!(settings.storage.region.as_deref(), Some("ap-northeast-1"));
    }

    #[test]
    fn test_required_treats_empty_as_missing() {
        assert_eq!(required(&Some("x".into()), "X").unwrap(), "x");
        let err = required(&Some(String::new()), SEARCH_API_KEY_ENV).unwrap_err();
        assert_eq!(err.to_string(), "TAVILY_API_KEY not set");
        assert!(required(&None, STORAGE_BUCKET_ENV).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "notification_topic = \"arn:aws:sns:us-east-1:1:decks\"").unwrap();

        let settings = Settings::load(Some(file.path())).await.unwrap();
        // The environment may supply the topic too; either way it is present.
        assert!(settings.notification_topic.is_some());
    }
}
