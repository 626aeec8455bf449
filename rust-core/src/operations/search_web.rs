use super::{Operation, SEARCH_WEB};
use crate::collaborators::{SearchProvider, SearchRequest};
use crate::config::{required, Settings, SEARCH_API_KEY_ENV};
use crate::dispatch::{Parameters, Payload};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct SearchWeb {
    api_key: Option<String>,
    max_results: usize,
    provider: Arc<dyn SearchProvider>,
}

impl SearchWeb {
    pub fn new(settings: &Settings, provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            api_key: settings.search_api_key.clone(),
            max_results: settings.search.max_results,
            provider,
        }
    }
}

#[async_trait]
impl Operation for SearchWeb {
    fn name(&self) -> &'static str {
        SEARCH_WEB
    }

    async fn invoke(&self, params: &Parameters) -> Result<Payload> {
        let api_key = required(&self.api_key, SEARCH_API_KEY_ENV)?;
        let query = params.get_or("query", "");

        let request = SearchRequest {
            api_key: api_key.to_string(),
            query: query.to_string(),
            max_results: self.max_results,
        };
        let response = self.provider.search(&request).await?;

        let results: Vec<Value> = response
            .results
            .into_iter()
            .take(self.max_results)
            .map(|hit| json!({"title": hit.title, "url": hit.url, "content": hit.content}))
            .collect();

        tracing::debug!(query = %query, results = results.len(), "Search complete");

        let mut payload = Payload::new();
        payload.insert("query".into(), Value::String(query.to_string()));
        payload.insert("results".into(), Value::Array(results));
        Ok(payload)
    }
}
