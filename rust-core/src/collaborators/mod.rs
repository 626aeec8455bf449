//! Narrow interfaces to the external systems the tools act on, plus the
//! production clients behind them.

pub mod knowledge;
pub mod notify;
pub mod search;
pub mod storage;

pub use knowledge::{HttpKnowledgeBase, KnowledgeBase, KnowledgeQuery};
pub use notify::{HttpNotifier, Notification, Notifier};
pub use search::{SearchHit, SearchProvider, SearchRequest, SearchResponse, TavilyClient};
pub use storage::{ObjectStore, OpendalStore, PRESIGN_TTL};

use crate::config::Settings;
use crate::deck::{DeckRenderer, PptxRenderer};
use crate::error::Result;
use std::sync::Arc;

/// The set of collaborators the dispatcher hands to its operations.
#[derive(Clone)]
pub struct Collaborators {
    pub search: Arc<dyn SearchProvider>,
    pub storage: Arc<dyn ObjectStore>,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: Arc<dyn DeckRenderer>,
}

impl Collaborators {
    /// Production clients configured from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            search: Arc::new(TavilyClient::new(&settings.search)?),
            storage: Arc::new(OpendalStore::new(settings.storage.clone())),
            notifier: Arc::new(HttpNotifier::new(&settings.notification)?),
            renderer: Arc::new(PptxRenderer),
        })
    }
}
