use crate::config::KnowledgeSettings;
use crate::error::{Result, ToolError};
use crate::security::validate_input;
use crate::stream::{decode_ndjson, EventStream};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// A retrieve-and-generate query against one knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeQuery {
    pub text: String,
    pub knowledge_base_id: String,
    pub model_arn: String,
}

impl KnowledgeQuery {
    /// Build a query, rejecting empty or oversized text before any call is made.
    pub fn new(
        text: impl Into<String>,
        knowledge_base_id: impl Into<String>,
        model_arn: impl Into<String>,
        max_chars: usize,
    ) -> Result<Self> {
        let text = text.into();
        validate_input(&text, max_chars)?;

        let knowledge_base_id = knowledge_base_id.into();
        if knowledge_base_id.trim().is_empty() {
            return Err(ToolError::InvalidInput("knowledge base id is required".into()));
        }

        Ok(Self {
            text,
            knowledge_base_id,
            model_arn: model_arn.into(),
        })
    }

    pub fn to_request_body(&self) -> RetrieveAndGenerateRequest<'_> {
        RetrieveAndGenerateRequest {
            input: QueryInput { text: &self.text },
            retrieve_and_generate_configuration: GenerationConfiguration {
                kind: "KNOWLEDGE_BASE",
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id: &self.knowledge_base_id,
                    model_arn: &self.model_arn,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveAndGenerateRequest<'a> {
    input: QueryInput<'a>,
    retrieve_and_generate_configuration: GenerationConfiguration<'a>,
}

#[derive(Debug, Serialize)]
struct QueryInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfiguration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    knowledge_base_configuration: KnowledgeBaseConfiguration<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseConfiguration<'a> {
    knowledge_base_id: &'a str,
    model_arn: &'a str,
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn retrieve_and_generate(&self, query: &KnowledgeQuery) -> Result<EventStream>;
}

/// Retrieve-and-generate over an HTTP gateway that answers with
/// newline-delimited JSON events.
pub struct HttpKnowledgeBase {
    http: Client,
    endpoint: String,
}

impl HttpKnowledgeBase {
    pub fn new(settings: &KnowledgeSettings) -> Self {
        Self {
            http: Client::new(),
            endpoint: settings.endpoint.clone(),
        }
    }
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn retrieve_and_generate(&self, query: &KnowledgeQuery) -> Result<EventStream> {
        tracing::info!(
            knowledge_base_id = %query.knowledge_base_id,
            model_arn = %query.model_arn,
            "Starting knowledge base stream"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&query.to_request_body())
            .send()
            .await?
            .error_for_status()?;

        Ok(decode_ndjson(response.bytes_stream()))
    }
}
