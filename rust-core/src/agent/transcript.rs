use super::{AgentEvent, OrchestrationTrace, Utf8Accumulator};
use crate::dispatch::Parameter;
use crate::operations::{CREATE_PPTX, SEARCH_WEB, SEND_EMAIL};
use serde::Serialize;

pub const SEARCH_KNOWLEDGE_BASE: &str = "search-knowledge-base";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Thinking,
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub content: String,
}

/// Human-readable name of a tool function; unknown names pass through.
pub fn display_name(function: &str) -> &str {
    match function {
        SEARCH_WEB => "Web search",
        SEARCH_KNOWLEDGE_BASE => "Knowledge base search",
        CREATE_PPTX => "Slide creation",
        SEND_EMAIL => "Email delivery",
        other => other,
    }
}

/// Short description of an invocation's arguments: the quoted `query` when
/// present, otherwise the first parameter as `name: value`.
pub fn parameter_summary(parameters: &[Parameter]) -> String {
    if let Some(query) = parameters.iter().find(|p| p.name == "query") {
        return format!("\"{}\"", query.value);
    }
    parameters
        .first()
        .map(|p| format!("{}: {}", p.name, p.value))
        .unwrap_or_default()
}

/// Running response text and trace entries of one agent invocation.
#[derive(Debug, Default)]
pub struct AgentTranscript {
    response: String,
    entries: Vec<TranscriptEntry>,
    decoder: Utf8Accumulator,
}

impl AgentTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event. Returns the entries it produced.
    pub fn apply(&mut self, event: &AgentEvent) -> &[TranscriptEntry] {
        let before = self.entries.len();

        if let Some(chunk) = &event.chunk {
            match chunk.decode() {
                Some(bytes) => {
                    let text = self.decoder.push(&bytes);
                    self.response.push_str(&text);
                }
                None => tracing::debug!("Skipping chunk with undecodable bytes"),
            }
        }

        if let Some(trace) = event.orchestration_trace() {
            self.apply_trace(trace);
        }

        &self.entries[before..]
    }

    fn apply_trace(&mut self, trace: &OrchestrationTrace) {
        if let Some(rationale) = &trace.rationale {
            if !rationale.text.is_empty() {
                self.entries.push(TranscriptEntry {
                    kind: EntryKind::Thinking,
                    content: rationale.text.clone(),
                });
            }
        }

        let action = trace
            .invocation_input
            .as_ref()
            .and_then(|input| input.action_group_invocation_input.as_ref());

        if let Some(action) = action {
            let summary = if action.function == SEND_EMAIL {
                String::new()
            } else {
                parameter_summary(&action.parameters)
            };

            let name = display_name(&action.function);
            let content = if summary.is_empty() {
                format!("Running {}", name)
            } else {
                format!("Running {} {}", name, summary)
            };

            self.entries.push(TranscriptEntry {
                kind: EntryKind::Action,
                content,
            });
        }
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Final response text, flushing any incomplete trailing character.
    pub fn finish(mut self) -> (String, Vec<TranscriptEntry>) {
        let tail = self.decoder.finish();
        self.response.push_str(&tail);
        (self.response, self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<Parameter> {
        pairs.iter().map(|(n, v)| Parameter::new(*n, *v)).collect()
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name("search-web"), "Web search");
        assert_eq!(display_name("search-knowledge-base"), "Knowledge base search");
        assert_eq!(display_name("create-pptx"), "Slide creation");
        assert_eq!(display_name("send-email"), "Email delivery");
        assert_eq!(display_name("translate"), "translate");
    }

    #[test]
    fn test_parameter_summary_prefers_query() {
        assert_eq!(
            parameter_summary(&params(&[("lang", "en"), ("query", "rust async")])),
            "\"rust async\""
        );
        assert_eq!(
            parameter_summary(&params(&[("title", "Roadmap"), ("content", "...")])),
            "title: Roadmap"
        );
        assert_eq!(parameter_summary(&[]), "");
    }

    #[test]
    fn test_action_entries() {
        let mut transcript = AgentTranscript::new();

        let produced = transcript.apply(&AgentEvent::orchestration(OrchestrationTrace::action(
            "search-web",
            params(&[("query", "bedrock agents")]),
        )));
        assert_eq!(produced[0].content, "Running Web search \"bedrock agents\"");

        transcript.apply(&AgentEvent::orchestration(OrchestrationTrace::action(
            "send-email",
            params(&[("url", "https://example.com/very/long")]),
        )));
        transcript.apply(&AgentEvent::orchestration(OrchestrationTrace::action(
            "create-pptx",
            Vec::new(),
        )));

        let contents: Vec<_> = transcript.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(
            contents,
            [
                "Running Web search \"bedrock agents\"",
                "Running Email delivery",
                "Running Slide creation"
            ]
        );
        assert!(transcript.entries().iter().all(|e| e.kind == EntryKind::Action));
    }

    #[test]
    fn test_thinking_entries_skip_empty_rationale() {
        let mut transcript = AgentTranscript::new();
        transcript.apply(&AgentEvent::orchestration(OrchestrationTrace::rationale("")));
        assert!(transcript.entries().is_empty());

        let produced = transcript.apply(&AgentEvent::orchestration(OrchestrationTrace::rationale(
            "I should search first.",
        )));
        assert_eq!(
            produced,
            [TranscriptEntry {
                kind: EntryKind::Thinking,
                content: "I should search first.".into()
            }]
        );
    }

    #[test]
    fn test_chunks_across_character_boundary() {
        let bytes = "資料ができました".as_bytes();
        let mut transcript = AgentTranscript::new();
        transcript.apply(&AgentEvent::chunk(&bytes[..5]));
        transcript.apply(&AgentEvent::chunk(&bytes[5..]));

        let (response, entries) = transcript.finish();
        assert_eq!(response, "資料ができました");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_undecodable_chunk_is_inert() {
        let mut transcript = AgentTranscript::new();
        transcript.apply(&AgentEvent::chunk(b"Hello"));
        let produced = transcript.apply(&AgentEvent {
            chunk: Some(crate::agent::AgentChunk {
                bytes: "not base64!".into(),
            }),
            trace: None,
        });

        assert!(produced.is_empty());
        assert_eq!(transcript.response(), "Hello");
    }
}
