//! Content extraction: URL in, [`ExtractionOutcome`] out.
//!
//! Listing URLs are rejected before any fetch. Otherwise the page is fetched
//! through the configured [`PageSource`] and handed to an ordered list of
//! [`ContentStrategy`] objects; the first to produce text wins.

pub mod strategies;

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::adapters::is_listing_url;
use crate::dom::Page;
use crate::fetch::PageSource;
use crate::model::{BlockReason, ExtractionOutcome};

pub use strategies::{ContentStrategy, default_strategies};

/// Minimum trimmed length for container text to count as a chord sheet.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 50;

pub struct ContentExtractor {
    source: Arc<dyn PageSource>,
    strategies: Vec<Box<dyn ContentStrategy>>,
}

impl ContentExtractor {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self::with_min_chars(source, DEFAULT_MIN_CONTENT_CHARS)
    }

    pub fn with_min_chars(source: Arc<dyn PageSource>, min_chars: usize) -> Self {
        Self {
            source,
            strategies: default_strategies(min_chars),
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn extract(&self, url: &Url) -> ExtractionOutcome {
        if is_listing_url(url) {
            info!(target: "chords.extract", %url, "chords.extract.listing_page");
            return ExtractionOutcome::NotDirectPage;
        }

        let html = match self.source.fetch(url).await {
            Ok(html) => html,
            Err(err) => {
                let reason = if err.is_timeout() {
                    BlockReason::TookTooLong
                } else {
                    BlockReason::Protected
                };
                warn!(
                    target: "chords.extract",
                    %url,
                    transport = self.source.transport(),
                    error = %err,
                    ?reason,
                    "chords.extract.fetch_failed"
                );
                return ExtractionOutcome::Blocked { reason };
            }
        };

        let outcome = self.extract_from_html(&html);
        if !outcome.is_success() {
            warn!(
                target: "chords.extract",
                %url,
                html_len = html.len(),
                "chords.extract.unrecognized_structure"
            );
        }
        outcome
    }

    /// Run the strategy chain over an already-fetched page.
    pub fn extract_from_html(&self, html: &str) -> ExtractionOutcome {
        let page = Page::parse(html);
        for strategy in &self.strategies {
            if let Some(text) = strategy.try_extract(&page) {
                debug!(
                    target: "chords.extract",
                    strategy = strategy.name(),
                    chars = text.chars().count(),
                    "chords.extract.matched"
                );
                return ExtractionOutcome::Success { text };
            }
        }
        ExtractionOutcome::NotFound
    }
}
