//! Site adapters: one per chord source.
//!
//! An adapter knows how to build its search URL, how to read that site's
//! results page, and which extractor to use for its song pages. The default
//! `search` method owns the shared contract: one fetch, failures logged and
//! turned into an empty list, results filtered, tier-sorted, and capped.

pub mod amdm;
pub mod ultimate_guitar;

use async_trait::async_trait;
use chordscout_common::ChordError;
use tracing::{debug, warn};
use url::Url;

use crate::extract::ContentExtractor;
use crate::fetch::PageSource;
use crate::model::{ExtractionOutcome, Query, ResultStub, Script};

pub use amdm::Amdm;
pub use ultimate_guitar::UltimateGuitar;

/// Maximum stubs a single adapter returns.
pub const MAX_RESULTS: usize = 10;

#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Display name, e.g. "Ultimate Guitar".
    fn name(&self) -> &'static str;

    /// Which query script this adapter serves.
    fn family(&self) -> Script;

    /// Whether `url` belongs to this source.
    fn handles(&self, url: &Url) -> bool;

    fn search_url(&self, query: &Query) -> Result<Url, ChordError>;

    /// Read stubs out of a search results page.
    fn parse_results(&self, html: &str) -> Result<Vec<ResultStub>, ChordError>;

    fn search_source(&self) -> &dyn PageSource;

    fn extractor(&self) -> &ContentExtractor;

    async fn search(&self, query: &Query) -> Vec<ResultStub> {
        match self.try_search(query).await {
            Ok(stubs) => stubs,
            Err(err) => {
                warn!(
                    target: "chords.adapter",
                    adapter = self.name(),
                    query = %query.raw(),
                    error = %err,
                    "chords.adapter.search_failed"
                );
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &Query) -> Result<Vec<ResultStub>, ChordError> {
        let url = self.search_url(query)?;
        let html = self.search_source().fetch(&url).await?;
        let parsed = self.parse_results(&html)?;
        let parsed_len = parsed.len();
        let stubs = finalize(parsed);
        debug!(
            target: "chords.adapter",
            adapter = self.name(),
            transport = self.search_source().transport(),
            parsed = parsed_len,
            kept = stubs.len(),
            "chords.adapter.search"
        );
        Ok(stubs)
    }

    async fn extract(&self, url: &Url) -> ExtractionOutcome {
        self.extractor().extract(url).await
    }
}

/// Drop inadmissible stubs, sort by tier (stable), cap at [`MAX_RESULTS`].
pub fn finalize(stubs: Vec<ResultStub>) -> Vec<ResultStub> {
    let mut kept: Vec<ResultStub> = stubs.into_iter().filter(is_admissible).collect();
    kept.sort_by(|a, b| b.tier.cmp(&a.tier));
    kept.truncate(MAX_RESULTS);
    kept
}

/// A stub may leave an adapter only with an absolute http(s) URL that is
/// not itself a search listing.
pub fn is_admissible(stub: &ResultStub) -> bool {
    match Url::parse(&stub.source_url) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && !is_listing_url(&url),
        Err(_) => false,
    }
}

/// Search/listing pages that never contain a single chord sheet.
pub fn is_listing_url(url: &Url) -> bool {
    let path = url.path();
    path.contains("/search.php")
        || path.contains("/search/")
        || path.trim_end_matches('/').ends_with("/search")
}

/// Resolve `href` against `base`, rejecting placeholders and non-web links.
pub fn absolutize(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.contains("submit") {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// "the-rolling_stones" -> "The Rolling Stones".
pub fn artist_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|t| !t.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Song title from the last path segment, without numeric ids or sheet-type
/// words: ".../wonderwall-chords-27596" -> "Wonderwall".
pub fn title_from_url(url: &Url) -> Option<String> {
    let slug = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !matches!(*w, "chords" | "tab" | "tabs" | "official"))
        .map(capitalize)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `url` is on `domain` or one of its subdomains.
pub fn on_domain(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            host == domain || host.ends_with(&format!(".{domain}"))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QualityTier, ResultKind};

    fn stub(url: &str, signal: &str) -> ResultStub {
        ResultStub::new("t", "a", url, ResultKind::Chords, signal, "test")
    }

    #[test]
    fn listing_urls_are_recognized() {
        for u in [
            "https://www.ultimate-guitar.com/search.php?value=x",
            "https://amdm.ru/search/?q=x",
            "https://example.com/songs/search",
        ] {
            assert!(is_listing_url(&Url::parse(u).unwrap()), "{u}");
        }
        let song = Url::parse("https://amdm.ru/akkordi/kino/99/gruppa_krovi/").unwrap();
        assert!(!is_listing_url(&song));
    }

    #[test]
    fn subdomains_count_as_the_site() {
        let tabs = Url::parse("https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-6097").unwrap();
        assert!(on_domain(&tabs, "ultimate-guitar.com"));
        let fake = Url::parse("https://notultimate-guitar.com/").unwrap();
        assert!(!on_domain(&fake, "ultimate-guitar.com"));
    }

    #[test]
    fn slug_becomes_artist() {
        assert_eq!(artist_from_slug("oasis"), "Oasis");
        assert_eq!(artist_from_slug("the-rolling_stones"), "The Rolling Stones");
        assert_eq!(artist_from_slug("kino"), "Kino");
        assert_eq!(artist_from_slug("--"), "");
    }

    #[test]
    fn slug_becomes_title() {
        let title = |u: &str| title_from_url(&Url::parse(u).unwrap());
        assert_eq!(
            title("https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-27596").as_deref(),
            Some("Wonderwall")
        );
        assert_eq!(
            title("https://amdm.ru/akkordi/kino/99/gruppa_krovi/").as_deref(),
            Some("Gruppa Krovi")
        );
        assert_eq!(title("https://amdm.ru/"), None);
    }

    #[test]
    fn placeholders_are_not_links() {
        let base = Url::parse("https://amdm.ru").unwrap();
        assert!(absolutize(&base, "#").is_none());
        assert!(absolutize(&base, "javascript:submit()").is_none());
        assert!(absolutize(&base, "mailto:x@y.z").is_none());
        assert_eq!(
            absolutize(&base, "/akkordi/kino/").unwrap().as_str(),
            "https://amdm.ru/akkordi/kino/"
        );
    }

    #[test]
    fn finalize_filters_sorts_and_caps() {
        let mut stubs = vec![
            stub("https://x.com/1", ""),
            stub("not a url", "Official version"),
            stub("https://x.com/search.php?q=a", "Official version"),
            stub("https://x.com/2", "Official version"),
            stub("https://x.com/3", "5 votes"),
        ];
        for i in 0..20 {
            stubs.push(stub(&format!("https://x.com/more/{i}"), ""));
        }
        let out = finalize(stubs);
        assert_eq!(out.len(), MAX_RESULTS);
        assert_eq!(out[0].source_url, "https://x.com/2");
        assert_eq!(out[0].tier, QualityTier::Official);
        assert_eq!(out[1].source_url, "https://x.com/3");
        // ties keep their original order
        assert_eq!(out[2].source_url, "https://x.com/1");
        assert_eq!(out[3].source_url, "https://x.com/more/0");
    }
}
