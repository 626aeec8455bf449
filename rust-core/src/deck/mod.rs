//! Slide planning for generated presentations.

pub mod pptx;

pub use pptx::PptxRenderer;

use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// Turns a planned deck into presentation file bytes.
pub trait DeckRenderer: Send + Sync {
    fn render(&self, deck: &SlideDeck) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub heading: String,
    pub body: Vec<String>,
}

impl Slide {
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }
}

/// A title slide followed by one content slide per block of the source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideDeck {
    pub title: String,
    pub subtitle: String,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    /// Plan a deck from free text.
    ///
    /// The trimmed text is split on blank lines (`"\n\n"`). Within a block the
    /// first line is the heading and the rest is the body. Leading list and
    /// heading markers (`-`, `#` and the spaces around them) are stripped
    /// from every line.
    pub fn plan(title: &str, content: &str, created_on: NaiveDate) -> Self {
        let content = content.trim();
        let slides = if content.is_empty() {
            Vec::new()
        } else {
            content.split("\n\n").map(plan_slide).collect()
        };

        Self {
            title: title.to_string(),
            subtitle: format!("Created: {}", created_on.format("%Y-%m-%d")),
            slides,
        }
    }

    /// Slide count including the title slide.
    pub fn slide_count(&self) -> usize {
        self.slides.len() + 1
    }
}

fn plan_slide(block: &str) -> Slide {
    let mut lines = block.split('\n');
    let heading = strip_markup(lines.next().unwrap_or_default()).to_string();
    let body = lines.map(|line| strip_markup(line).to_string()).collect();
    Slide { heading, body }
}

/// Strip a leading run of list markers, then a leading run of heading markers.
pub fn strip_markup(line: &str) -> &str {
    line.trim_start_matches(['-', ' '])
        .trim_start_matches(['#', ' '])
}
