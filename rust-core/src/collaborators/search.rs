use crate::config::SearchSettings;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub api_key: String,
    pub query: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

/// Web search over the Tavily HTTP API.
pub struct TavilyClient {
    http: Client,
    endpoint: String,
}

impl TavilyClient {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
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
impl SearchProvider for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        tracing::debug!(endpoint = %self.endpoint, max_results = request.max_results, "Sending search request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<SearchResponse>().await?)
    }
}
