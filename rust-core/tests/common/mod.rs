#![allow(dead_code)]

use async_trait::async_trait;
use deck_agent_core::collaborators::{
    Notification, Notifier, ObjectStore, SearchHit, SearchProvider, SearchRequest, SearchResponse,
};
use deck_agent_core::deck::{DeckRenderer, SlideDeck};
use deck_agent_core::{Collaborators, Result, Settings, ToolError};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct MockSearch {
    pub hits: Vec<SearchHit>,
    pub timeout: bool,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearch {
    pub fn with_hits(count: usize) -> Self {
        let hits = (1..=count)
            .map(|n| SearchHit {
                title: format!("Result {}", n),
                url: format!("https://example.com/{}", n),
                content: format!("Snippet {}", n),
            })
            .collect();
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn timing_out() -> Self {
        Self {
            timeout: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.timeout {
            return Err(ToolError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "search request timed out",
            )));
        }
        Ok(SearchResponse {
            results: self.hits.clone(),
        })
    }
}

#[derive(Default)]
pub struct MockStore {
    pub fail_put: bool,
    pub puts: Mutex<Vec<(String, String, usize)>>,
    pub presigns: Mutex<Vec<(String, String, Duration)>>,
}

impl MockStore {
    pub fn failing() -> Self {
        Self {
            fail_put: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.puts.lock().unwrap().len() + self.presigns.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn put(&self, bucket: &str, key: &str, content: Vec<u8>) -> Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), content.len()));
        if self.fail_put {
            return Err(ToolError::Storage("access denied".into()));
        }
        Ok(())
    }

    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        self.presigns
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), expires_in));
        Ok(format!("https://{}.s3.example.com/{}?X-Amz-Expires={}", bucket, key, expires_in.as_secs()))
    }
}

#[derive(Default)]
pub struct MockNotifier {
    pub fail: bool,
    pub published: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn calls(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn publish(&self, notification: &Notification) -> Result<String> {
        self.published.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(ToolError::Notification("topic does not exist".into()));
        }
        Ok("msg-0001".to_string())
    }
}

/// Records planned decks and returns placeholder bytes.
#[derive(Default)]
pub struct RecordingRenderer {
    pub decks: Mutex<Vec<SlideDeck>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> usize {
        self.decks.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<SlideDeck> {
        self.decks.lock().unwrap().last().cloned()
    }
}

impl DeckRenderer for RecordingRenderer {
    fn render(&self, deck: &SlideDeck) -> Result<Vec<u8>> {
        self.decks.lock().unwrap().push(deck.clone());
        Ok(b"PK-fake-deck".to_vec())
    }
}

pub struct PanickingRenderer;

impl DeckRenderer for PanickingRenderer {
    fn render(&self, _deck: &SlideDeck) -> Result<Vec<u8>> {
        panic!("renderer exploded");
    }
}

/// Test doubles shared between the dispatcher and the assertions.
pub struct Harness {
    pub search: Arc<MockSearch>,
    pub store: Arc<MockStore>,
    pub notifier: Arc<MockNotifier>,
    pub renderer: Arc<RecordingRenderer>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(MockSearch::with_hits(3), MockStore::default(), MockNotifier::default())
    }
}

impl Harness {
    pub fn new(search: MockSearch, store: MockStore, notifier: MockNotifier) -> Self {
        Self {
            search: Arc::new(search),
            store: Arc::new(store),
            notifier: Arc::new(notifier),
            renderer: Arc::new(RecordingRenderer::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            search: self.search.clone(),
            storage: self.store.clone(),
            notifier: self.notifier.clone(),
            renderer: self.renderer.clone(),
        }
    }

    pub fn total_calls(&self) -> usize {
        self.search.calls() + self.store.calls() + self.notifier.calls() + self.renderer.calls()
    }
}

pub fn configured_settings() -> Settings {
    Settings {
        search_api_key: Some("tvly-test".to_string()),
        storage_bucket: Some("deck-bucket".to_string()),
        notification_topic: Some("arn:aws:sns:us-east-1:123456789012:decks".to_string()),
        ..Settings::default()
    }
}
