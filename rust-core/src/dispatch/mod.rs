pub mod envelope;

pub use envelope::{Payload, ToolResponseEnvelope, ToolResult, MESSAGE_VERSION};

use crate::collaborators::Collaborators;
use crate::config::Settings;
use crate::error::ToolError;
use crate::log_tool;
use crate::observability::{InvocationOutcome, MetricsCollector};
use crate::operations::{CreatePptx, Operation, SearchWeb, SendEmail};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// One function call issued by the agent runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolRequest {
    pub action_group: String,
    pub function: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: None,
        }
    }
}

impl ToolRequest {
    pub fn new(action_group: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            action_group: action_group.into(),
            function: function.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    pub fn parameter_map(&self) -> Parameters {
        self.parameters.iter().cloned().collect()
    }
}

/// Name to value view over request parameters. A repeated name keeps its
/// last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: HashMap<String, String>,
}

impl Parameters {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let values = iter.into_iter().map(|p| (p.name, p.value)).collect();
        Self { values }
    }
}

/// Routes tool calls to the fixed set of operations and always answers with
/// a well-formed envelope.
pub struct Dispatcher {
    operations: HashMap<&'static str, Arc<dyn Operation>>,
    metrics: Option<MetricsCollector>,
}

impl Dispatcher {
    pub fn new(settings: &Settings, collaborators: Collaborators) -> Self {
        let operations: [Arc<dyn Operation>; 3] = [
            Arc::new(SearchWeb::new(settings, collaborators.search)),
            Arc::new(CreatePptx::new(
                settings,
                collaborators.storage,
                collaborators.renderer,
            )),
            Arc::new(SendEmail::new(settings, collaborators.notifier)),
        ];

        Self {
            operations: operations.into_iter().map(|op| (op.name(), op)).collect(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Registered function names, sorted.
    pub fn functions(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn dispatch(&self, request: ToolRequest) -> ToolResponseEnvelope {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            invocation_id = %invocation_id,
            action_group = %request.action_group,
            function = %request.function,
        );

        async move {
            tracing::debug!(parameters = request.parameters.len(), "Received tool request");
            let params = request.parameter_map();
            let result = self.run(&request.function, &params).await;
            ToolResponseEnvelope::new(request.action_group, request.function, &result)
        }
        .instrument(span)
        .await
    }

    /// Dispatch a raw JSON event. An event that does not have the request
    /// shape still gets an envelope, with an error body.
    pub async fn dispatch_value(&self, event: Value) -> ToolResponseEnvelope {
        match serde_json::from_value::<ToolRequest>(event.clone()) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => {
                let field = |key: &str| {
                    event
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                tracing::warn!(error = %err, "Rejected malformed tool request");
                ToolResponseEnvelope::new(
                    field("actionGroup"),
                    field("function"),
                    &ToolResult::error(format!("Invalid request: {}", err)),
                )
            }
        }
    }

    async fn run(&self, function: &str, params: &Parameters) -> ToolResult {
        let Some(operation) = self.operations.get(function) else {
            log_tool!(warn, function, "Unknown function requested");
            let result: ToolResult = ToolError::UnknownFunction(function.to_string()).into();
            self.record(function, InvocationOutcome::Unknown, Instant::now());
            return result;
        };

        if let Some(metrics) = &self.metrics {
            metrics.increment_in_flight();
        }
        let started = Instant::now();

        let outcome = AssertUnwindSafe(operation.invoke(params))
            .catch_unwind()
            .await;

        if let Some(metrics) = &self.metrics {
            metrics.decrement_in_flight();
        }

        match outcome {
            Ok(Ok(payload)) => {
                log_tool!(
                    info,
                    function,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Operation succeeded"
                );
                self.record(function, InvocationOutcome::Success, started);
                ToolResult::Success(payload)
            }
            Ok(Err(err)) => {
                log_tool!(warn, function, error = %err, "Operation failed");
                self.record(function, InvocationOutcome::Error, started);
                err.into()
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log_tool!(error, function, panic = %message, "Operation panicked");
                self.record(function, InvocationOutcome::Error, started);
                ToolResult::error(format!("Operation {} failed: {}", function, message))
            }
        }
    }

    fn record(&self, function: &str, outcome: InvocationOutcome, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_invocation(function, outcome, started.elapsed());
        }
    }
}
