//! Streaming answer aggregation for knowledge-base queries.
//!
//! A generation stream interleaves answer fragments with citation batches.
//! [`StreamAggregator`] folds them, one event at a time, into the answer text
//! plus a first-seen ordered list of cited locations.

pub mod aggregator;
pub mod ndjson;
pub mod ordered_set;

pub use aggregator::{aggregate, AggregateState, StreamAggregator};
pub use ndjson::{decode_ndjson, EventStream, MAX_LINE_BYTES};
pub use ordered_set::OrderedSet;

use serde::{Deserialize, Serialize};

/// One unit of a generation stream.
///
/// Either part may be present. An event carrying neither is inert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<CitationPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPart {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitationPart {
    pub retrieved_references: Vec<RetrievedReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievedReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_location: Option<S3Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_location: Option<WebLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Location {
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebLocation {
    pub url: String,
}

impl StreamEvent {
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            output: Some(OutputPart { text: text.into() }),
            citation: None,
        }
    }

    pub fn citation(references: Vec<RetrievedReference>) -> Self {
        Self {
            output: None,
            citation: Some(CitationPart {
                retrieved_references: references,
            }),
        }
    }

    pub fn is_inert(&self) -> bool {
        self.output.is_none() && self.citation.is_none()
    }
}

impl RetrievedReference {
    pub fn s3(uri: impl Into<String>) -> Self {
        Self {
            location: Some(Location {
                s3_location: Some(S3Location { uri: uri.into() }),
                web_location: None,
            }),
        }
    }

    pub fn web(url: impl Into<String>) -> Self {
        Self {
            location: Some(Location {
                s3_location: None,
                web_location: Some(WebLocation { url: url.into() }),
            }),
        }
    }

    /// The location identifier, if the reference carries a non-empty one.
    /// Object-storage URIs take precedence over web URLs.
    pub fn identifier(&self) -> Option<&str> {
        let location = self.location.as_ref()?;
        location
            .s3_location
            .as_ref()
            .map(|s3| s3.uri.as_str())
            .filter(|uri| !uri.is_empty())
            .or_else(|| {
                location
                    .web_location
                    .as_ref()
                    .map(|web| web.url.as_str())
                    .filter(|url| !url.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_wire_events() {
        let output: StreamEvent = serde_json::from_value(json!({"output": {"text": "Hel"}})).unwrap();
        assert_eq!(output, StreamEvent::output("Hel"));

        let citation: StreamEvent = serde_json::from_value(json!({
            "citation": {
                "generatedResponsePart": {"textResponsePart": {"text": "Hello"}},
                "retrievedReferences": [
                    {"content": {"text": "..."}, "location": {"type": "S3", "s3Location": {"uri": "s3://a/b"}}}
                ]
            }
        }))
        .unwrap();
        assert_eq!(citation, StreamEvent::citation(vec![RetrievedReference::s3("s3://a/b")]));
    }

    #[test]
    fn test_unrecognized_event_is_inert() {
        let event: StreamEvent = serde_json::from_value(json!({"guardrail": {"action": "NONE"}})).unwrap();
        assert!(event.is_inert());
    }

    #[test]
    fn test_identifier_resolution() {
        assert_eq!(RetrievedReference::s3("s3://a/b").identifier(), Some("s3://a/b"));
        assert_eq!(RetrievedReference::web("https://x.dev").identifier(), Some("https://x.dev"));
        assert_eq!(RetrievedReference::s3("").identifier(), None);
        assert_eq!(RetrievedReference::default().identifier(), None);

        let both = RetrievedReference {
            location: Some(Location {
                s3_location: Some(S3Location { uri: String::new() }),
                web_location: Some(WebLocation { url: "https://x.dev".into() }),
            }),
        };
        assert_eq!(both.identifier(), Some("https://x.dev"));
    }
}
