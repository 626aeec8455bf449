use super::{OrderedSet, StreamEvent};
use crate::error::Result;
use futures::{Stream, StreamExt};
use serde::Serialize;

/// Answer text and citations accumulated so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateState {
    answer_text: String,
    citations: OrderedSet,
}

impl AggregateState {
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn citations(&self) -> &[String] {
        self.citations.as_slice()
    }
}

/// Folds generation stream events into an [`AggregateState`].
///
/// Output fragments are appended verbatim in arrival order. Citation
/// identifiers are kept in first-seen order without duplicates; references
/// without an identifier are skipped. No attempt is made to tie a citation
/// to a span of the answer.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    state: AggregateState,
    events_seen: usize,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns whether the visible state changed.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        self.events_seen += 1;
        let mut changed = false;

        if let Some(output) = &event.output {
            if !output.text.is_empty() {
                self.state.answer_text.push_str(&output.text);
                changed = true;
            }
        }

        if let Some(citation) = &event.citation {
            for reference in &citation.retrieved_references {
                if let Some(identifier) = reference.identifier() {
                    changed |= self.state.citations.insert(identifier);
                }
            }
        }

        changed
    }

    /// Current partial state, valid after any prefix of events.
    pub fn current_state(&self) -> &AggregateState {
        &self.state
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Drive the aggregator from a stream, calling `on_update` after every
    /// event that changed the state. Stops at the first stream failure and
    /// returns it; the state accumulated up to that point is kept.
    pub async fn consume<S, F>(&mut self, stream: S, mut on_update: F) -> Result<()>
    where
        S: Stream<Item = Result<StreamEvent>>,
        F: FnMut(&StreamEvent, &AggregateState),
    {
        futures::pin_mut!(stream);
        while let Some(event) = stream.next().await {
            let event = event?;
            if self.apply(&event) {
                on_update(&event, &self.state);
            }
        }

        tracing::debug!(
            events = self.events_seen,
            answer_chars = self.state.answer_text.chars().count(),
            citations = self.state.citations.len(),
            "Stream complete"
        );
        Ok(())
    }

    pub fn finish(self) -> AggregateState {
        self.state
    }
}

/// Fold a whole stream into its final state.
pub async fn aggregate<S>(stream: S) -> Result<AggregateState>
where
    S: Stream<Item = Result<StreamEvent>>,
{
    let mut aggregator = StreamAggregator::new();
    aggregator.consume(stream, |_, _| {}).await?;
    Ok(aggregator.finish())
}
