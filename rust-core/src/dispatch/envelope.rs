use crate::error::ToolError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const MESSAGE_VERSION: &str = "1.0";

/// Success payload of an operation: an open mapping of string keys to values.
pub type Payload = Map<String, Value>;

/// Outcome of one operation. Serializes as the bare payload object on
/// success and as `{"error": <message>}` on failure.
///
/// Decoding treats a body as an error only when `error` is its sole key and
/// holds a string; any other object is a success payload, even one that
/// carries an `error` field among others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Error { error: String },
    Success(Payload),
}

impl ToolResult {
    pub fn error(message: impl Into<String>) -> Self {
        ToolResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResult::Error { error } => Some(error),
            ToolResult::Success(_) => None,
        }
    }

    /// Serialized body text; non-ASCII characters are kept as-is.
    pub fn to_body(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            Value::Object(
                [("error".to_string(), Value::String(e.to_string()))]
                    .into_iter()
                    .collect(),
            )
            .to_string()
        })
    }
}

impl<'de> Deserialize<'de> for ToolResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let payload = Payload::deserialize(deserializer)?;
        if payload.len() == 1 {
            if let Some(Value::String(message)) = payload.get("error") {
                return Ok(ToolResult::error(message.clone()));
            }
        }
        Ok(ToolResult::Success(payload))
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::error(err.to_string())
    }
}

impl From<crate::error::Result<Payload>> for ToolResult {
    fn from(result: crate::error::Result<Payload>) -> Self {
        match result {
            Ok(payload) => ToolResult::Success(payload),
            Err(err) => err.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponseEnvelope {
    pub message_version: String,
    pub response: ToolResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl ToolResponseEnvelope {
    pub fn new(action_group: String, function: String, result: &ToolResult) -> Self {
        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: ToolResponse {
                action_group,
                function,
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody {
                            body: result.to_body(),
                        },
                    },
                },
            },
        }
    }

    /// Raw body text as sent to the agent.
    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }

    /// Body decoded back into a [`ToolResult`].
    pub fn result(&self) -> Result<ToolResult, serde_json::Error> {
        serde_json::from_str(self.body())
    }
}
