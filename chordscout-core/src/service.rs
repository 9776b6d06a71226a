//! Public entry point: search, extract, and search-then-extract.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chordscout_common::{ChordError, Result};
use chordscout_config::{ScoutConfig, SourceKind, SourceSpec, Transport};
use futures::future::join_all;
use tracing::{info, warn};
use url::Url;

use crate::adapters::{self, Amdm, SiteAdapter, UltimateGuitar, is_listing_url, on_domain};
use crate::extract::ContentExtractor;
use crate::fetch::{BrowserPageSource, HttpPageSource, PageSource};
use crate::guidance;
use crate::model::{ChordContent, ExtractionOutcome, NormalizedResult, Query};
use crate::normalize::{into_inputs, normalize};
use crate::router::Router;

const CHORDIFY_DOMAIN: &str = "chordify.net";

/// Facade over the router, adapters, extractor, and normalizer.
#[derive(Clone)]
pub struct ChordService {
    router: Router,
}

impl ChordService {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Build adapters for every enabled source in `config`, in listed order.
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        let mut router = Router::default();
        for spec in config.sources.iter().filter(|s| s.enabled) {
            router.register(build_adapter(spec, config)?);
        }
        if router.adapters().is_empty() {
            warn!(target: "chords.router", "no chord sources enabled");
        }
        Ok(Self::new(router))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Search every adapter of the query's script and return ranked results.
    ///
    /// Adapters run concurrently; their lists are merged in registration
    /// order regardless of which finished first.
    pub async fn search_chords(&self, raw_query: &str) -> Result<Vec<NormalizedResult>> {
        let query = Query::parse(raw_query)?;
        let routed = self.router.route(&query);

        let per_adapter = join_all(routed.iter().map(|a| a.search(&query))).await;
        let stubs: Vec<_> = per_adapter.into_iter().flatten().collect();

        let results = normalize(&query, stubs, &HashMap::new());
        info!(
            target: "chords.router",
            query = %query.raw(),
            results = results.len(),
            "chords.search.done"
        );
        Ok(results)
    }

    /// Chord text for one song URL, or guidance text explaining why not.
    pub async fn extract_chord_content(&self, raw_url: &str) -> Result<ChordContent> {
        Ok(ChordContent {
            text: self.extract(raw_url).await?.into_text(),
        })
    }

    /// Like [`extract_chord_content`](Self::extract_chord_content) but keeps
    /// chord text and guidance apart.
    pub async fn extract(&self, raw_url: &str) -> Result<Extracted> {
        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return Err(ChordError::InvalidInput("url is required".into()));
        }

        let Ok(url) = Url::parse(raw_url) else {
            return Ok(Extracted::guidance(guidance::INVALID_URL));
        };

        if is_listing_url(&url) {
            info!(target: "chords.extract", %url, "chords.extract.listing_page");
            return Ok(Extracted::guidance(guidance::LISTING_PAGE));
        }

        if on_domain(&url, CHORDIFY_DOMAIN) {
            return Ok(Extracted::guidance(guidance::CHORDIFY));
        }

        let Some(adapter) = self.router.adapter_for(&url) else {
            let err = ChordError::UnsupportedSource(url.host_str().unwrap_or_default().to_string());
            info!(target: "chords.extract", %url, error = %err, "chords.extract.unsupported");
            return Ok(Extracted::Guidance(guidance::unsupported(&self.source_names())));
        };

        let outcome = adapter.extract(&url).await;
        info!(
            target: "chords.extract",
            %url,
            adapter = adapter.name(),
            success = outcome.is_success(),
            "chords.extract.done"
        );
        Ok(match outcome {
            ExtractionOutcome::Success { text } => Extracted::Chords(text),
            other => Extracted::Guidance(other.into_content().text),
        })
    }

    /// Search, then extract the first `top_n` extractable results one at a
    /// time and attach their text.
    pub async fn search_and_extract(
        &self,
        raw_query: &str,
        top_n: usize,
    ) -> Result<Vec<NormalizedResult>> {
        let query = Query::parse(raw_query)?;
        let results = self.search_chords(query.raw()).await?;
        let (stubs, mut texts) = into_inputs(results);

        for stub in stubs.iter().filter(|s| s.extractable).take(top_n) {
            let Ok(url) = Url::parse(&stub.source_url) else {
                continue;
            };
            let Some(adapter) = self.router.adapter_for(&url) else {
                continue;
            };
            if let Some(text) = adapter.extract(&url).await.text() {
                texts.insert(stub.source_url.clone(), text.to_string());
            }
        }

        Ok(normalize(&query, stubs, &texts))
    }

    fn source_names(&self) -> Vec<&'static str> {
        self.router.adapters().iter().map(|a| a.name()).collect()
    }
}

/// Result of one extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Chords(String),
    /// Why no chords came back, worded for the user.
    Guidance(String),
}

impl Extracted {
    fn guidance(text: &str) -> Self {
        Self::Guidance(text.to_string())
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Chords(text) | Self::Guidance(text) => text,
        }
    }
}

/// Transports used when a source does not configure its own.
pub fn default_transports(kind: SourceKind) -> (Transport, Transport) {
    match kind {
        SourceKind::UltimateGuitar => (Transport::Browser, Transport::Browser),
        SourceKind::Amdm => (Transport::Http, Transport::Browser),
    }
}

fn build_adapter(spec: &SourceSpec, config: &ScoutConfig) -> Result<Arc<dyn SiteAdapter>> {
    let (default_search, default_extract) = default_transports(spec.id);
    let search_transport = spec.search_transport.unwrap_or(default_search);
    let extract_transport = spec.extract_transport.unwrap_or(default_extract);

    let base = match spec.id {
        SourceKind::UltimateGuitar => adapters::ultimate_guitar::BASE,
        SourceKind::Amdm => adapters::amdm::BASE,
    };
    let search_budget = match search_transport {
        Transport::Http => Duration::from_secs(config.http.timeout_secs),
        Transport::Browser => Duration::from_secs(config.extraction.search_timeout_secs),
    };
    let extract_budget = Duration::from_secs(config.extraction.timeout_secs);

    let search_source = page_source(search_transport, base, config, search_budget)?;
    let extract_source = page_source(extract_transport, base, config, extract_budget)?;
    let extractor =
        ContentExtractor::with_min_chars(extract_source, config.extraction.min_content_chars);

    let adapter: Arc<dyn SiteAdapter> = match spec.id {
        SourceKind::UltimateGuitar => Arc::new(UltimateGuitar::new(search_source, extractor)?),
        SourceKind::Amdm => Arc::new(Amdm::new(search_source, extractor)?),
    };
    Ok(adapter)
}

fn page_source(
    transport: Transport,
    base: &str,
    config: &ScoutConfig,
    budget: Duration,
) -> Result<Arc<dyn PageSource>> {
    let source: Arc<dyn PageSource> = match transport {
        Transport::Http => Arc::new(HttpPageSource::new(base, &config.http)?.with_timeout(budget)),
        Transport::Browser => Arc::new(BrowserPageSource::new(&config.browser, budget)),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Script;

    #[test]
    fn default_config_registers_both_sources_in_order() {
        let service = ChordService::from_config(&ScoutConfig::default()).unwrap();
        let names: Vec<_> = service.router().adapters().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Ultimate Guitar", "AMDM.ru"]);
        let families: Vec<_> = service.router().adapters().iter().map(|a| a.family()).collect();
        assert_eq!(families, vec![Script::Other, Script::Cyrillic]);
    }

    #[test]
    fn disabled_sources_are_skipped() {
        let mut config = ScoutConfig::default();
        config.sources[1].enabled = false;
        let service = ChordService::from_config(&config).unwrap();
        assert_eq!(service.router().adapters().len(), 1);
    }

    #[tokio::test]
    async fn blank_inputs_are_caller_errors() {
        let service = ChordService::new(Router::default());
        assert!(service.search_chords("  ").await.unwrap_err().is_caller_error());
        assert!(service.extract_chord_content("").await.unwrap_err().is_caller_error());
    }

    #[tokio::test]
    async fn guidance_for_urls_no_adapter_can_read() {
        let service = ChordService::from_config(&ScoutConfig::default()).unwrap();

        let text = service.extract_chord_content("not a url").await.unwrap().text;
        assert_eq!(text, guidance::INVALID_URL);

        let text = service
            .extract_chord_content("https://chordify.net/chords/oasis-wonderwall")
            .await
            .unwrap()
            .text;
        assert_eq!(text, guidance::CHORDIFY);

        let text = service
            .extract_chord_content("https://amdm.ru/search/?q=кино")
            .await
            .unwrap()
            .text;
        assert_eq!(text, guidance::LISTING_PAGE);

        let text = service
            .extract_chord_content("https://example.com/song/1")
            .await
            .unwrap()
            .text;
        assert!(text.contains("Ultimate Guitar and AMDM.ru"));
    }
}
