//! Agent invocation streams: response chunks interleaved with orchestration
//! traces, folded into a readable transcript.

pub mod transcript;
pub mod utf8;

pub use transcript::{AgentTranscript, EntryKind, TranscriptEntry};
pub use utf8::Utf8Accumulator;

use crate::dispatch::Parameter;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// One event of an agent invocation stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk: Option<AgentChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TracePart>,
}

/// Response bytes, base64 encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentChunk {
    pub bytes: String,
}

impl AgentChunk {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: STANDARD.encode(bytes),
        }
    }

    /// Decoded payload, or `None` when the bytes are not valid base64.
    pub fn decode(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.bytes).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestration_trace: Option<OrchestrationTrace>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrchestrationTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Rationale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_input: Option<InvocationInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rationale {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_group_invocation_input: Option<ActionGroupInvocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionGroupInvocation {
    pub function: String,
    pub parameters: Vec<Parameter>,
}

impl AgentEvent {
    pub fn chunk(bytes: &[u8]) -> Self {
        Self {
            chunk: Some(AgentChunk::from_bytes(bytes)),
            trace: None,
        }
    }

    pub fn orchestration(trace: OrchestrationTrace) -> Self {
        Self {
            chunk: None,
            trace: Some(TracePart {
                trace: Some(Trace {
                    orchestration_trace: Some(trace),
                }),
            }),
        }
    }

    pub fn orchestration_trace(&self) -> Option<&OrchestrationTrace> {
        self.trace
            .as_ref()?
            .trace
            .as_ref()?
            .orchestration_trace
            .as_ref()
    }
}

impl OrchestrationTrace {
    pub fn rationale(text: impl Into<String>) -> Self {
        Self {
            rationale: Some(Rationale { text: text.into() }),
            invocation_input: None,
        }
    }

    pub fn action(function: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            rationale: None,
            invocation_input: Some(InvocationInput {
                action_group_invocation_input: Some(ActionGroupInvocation {
                    function: function.into(),
                    parameters,
                }),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_event_wire_shape() {
        let event: AgentEvent = serde_json::from_value(json!({
            "trace": {"trace": {"orchestrationTrace": {
                "rationale": {"text": "Search first."},
                "invocationInput": {"actionGroupInvocationInput": {
                    "actionGroupName": "tools",
                    "function": "search-web",
                    "parameters": [{"name": "query", "type": "string", "value": "rust"}]
                }}
            }}}
        }))
        .unwrap();

        let trace = event.orchestration_trace().unwrap();
        assert_eq!(trace.rationale.as_ref().unwrap().text, "Search first.");
        let action = trace
            .invocation_input
            .as_ref()
            .and_then(|i| i.action_group_invocation_input.as_ref())
            .unwrap();
        assert_eq!(action.function, "search-web");
        assert_eq!(action.parameters[0].value, "rust");
    }

    #[test]
    fn test_chunk_base64() {
        let event: AgentEvent = serde_json::from_value(json!({"chunk": {"bytes": "SGk="}})).unwrap();
        assert_eq!(event.chunk.unwrap().decode().unwrap(), b"Hi");

        assert_eq!(AgentChunk::from_bytes(b"Hi").bytes, "SGk=");
        assert!(AgentChunk { bytes: "%%%".into() }.decode().is_none());
    }
}
