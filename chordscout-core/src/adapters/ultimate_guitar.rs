//! Ultimate Guitar: Latin-script tab archive.
//!
//! Search pages carry their results twice: as JSON in the `js-store` blob and
//! as rendered rows (`div.dyhP1`). The JSON is preferred because it has
//! ratings and official flags; the rows are read only when the blob is
//! missing or yields nothing usable.

use std::cmp::Ordering;
use std::sync::Arc;

use chordscout_common::ChordError;
use scraper::Html;
use serde_json::Value;
use url::Url;

use super::{SiteAdapter, absolutize, artist_from_slug, on_domain};
use crate::dom::{self, first, inline_text};
use crate::embedded;
use crate::extract::ContentExtractor;
use crate::fetch::PageSource;
use crate::model::{Query, ResultKind, ResultStub, Script};

pub const NAME: &str = "Ultimate Guitar";
pub const DOMAIN: &str = "ultimate-guitar.com";
pub const BASE: &str = "https://www.ultimate-guitar.com/";
const OFFICIAL_STAR_FILL: &str = "#00E148";

pub struct UltimateGuitar {
    base: Url,
    search_source: Arc<dyn PageSource>,
    extractor: ContentExtractor,
}

impl UltimateGuitar {
    pub fn new(search_source: Arc<dyn PageSource>, extractor: ContentExtractor) -> Result<Self, ChordError> {
        let base = Url::parse(BASE).map_err(|e| ChordError::Config(e.to_string()))?;
        Ok(Self {
            base,
            search_source,
            extractor,
        })
    }

    fn parse_rows(&self, doc: &Html) -> Option<Vec<ResultStub>> {
        let row_sel = dom::selector("div.dyhP1")?;
        let mut rows = doc.select(&row_sel).peekable();
        rows.peek()?;

        // first row is the column header
        let stubs = rows.skip(1).filter_map(|row| self.parse_row(row)).collect();
        Some(stubs)
    }

    fn parse_row(&self, row: scraper::ElementRef<'_>) -> Option<ResultStub> {
        let artist = first(row, ".SUEyv, .qNp1Q:first-child")
            .and_then(|cell| first(cell, r#"a[href*="/artist/"]"#))
            .map(inline_text)
            .filter(|s| !s.is_empty());

        let song_cell = first(row, ".SGCxQ, .qNp1Q:nth-child(2)")?;
        let link = first(song_cell, "a[tabcount]").or_else(|| first(song_cell, "a"))?;

        let title = Some(inline_text(link))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown Song".to_string());

        let attr = |name: &str| {
            link.value()
                .attr(name)
                .map(str::trim)
                .filter(|h| !h.is_empty() && *h != "#")
        };
        let href = attr("href")
            .or_else(|| attr("data-url"))
            .or_else(|| attr("data-href"))
            .or_else(|| {
                first(row, r#"a[href*="/tab/"]"#).and_then(|a| a.value().attr("href"))
            })?;
        let url = absolutize(&self.base, href)?;

        let artist = artist
            .or_else(|| artist_from_tab_url(&url))
            .unwrap_or_else(|| "Unknown Artist".to_string());

        let quality = row_quality(row, link);
        let kind = ResultKind::classify(&dom::text_content(row));

        Some(ResultStub::new(title, artist, url.as_str(), kind, quality, NAME))
    }
}

/// "Official" from the tooltip or green star, else the row's rating label.
fn row_quality(row: scraper::ElementRef<'_>, link: scraper::ElementRef<'_>) -> String {
    let tooltip_official = first(link, "[data-tip]")
        .and_then(|el| el.value().attr("data-tip"))
        .is_some_and(|tip| tip.contains("Official version"));
    let star = format!(r#"svg path[fill="{OFFICIAL_STAR_FILL}"]"#);
    if tooltip_official || first(link, &star).is_some() {
        return "Official".to_string();
    }
    first(row, ".D8BqY").map(inline_text).unwrap_or_default()
}

/// `/tab/<artist-slug>/...` -> "Artist Name".
fn artist_from_tab_url(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    if segments.next()? != "tab" {
        return None;
    }
    let artist = artist_from_slug(segments.next()?);
    (!artist.is_empty()).then_some(artist)
}

/// Chords and official entries from the embedded result list, best-rated first.
fn parse_embedded(results: &[Value], base: &Url) -> Vec<ResultStub> {
    let mut rated: Vec<(f64, ResultStub)> = results
        .iter()
        .filter_map(|entry| embedded_entry(entry, base))
        .collect();
    rated.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    rated.into_iter().map(|(_, stub)| stub).collect()
}

fn embedded_entry(entry: &Value, base: &Url) -> Option<(f64, ResultStub)> {
    let str_field = |key: &str| entry.get(key).and_then(Value::as_str).map(str::trim);

    let type_name = str_field("type").unwrap_or_default();
    let official = type_name.eq_ignore_ascii_case("official")
        || entry.get("is_official").and_then(Value::as_bool).unwrap_or(false)
        || str_field("marketing_type").is_some_and(|m| m.eq_ignore_ascii_case("official"));
    if !(official || type_name == "Chords") {
        return None;
    }

    let url = absolutize(base, str_field("tab_url")?)?;
    let title = str_field("song_name")
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown Song");
    let artist = str_field("artist_name")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| artist_from_tab_url(&url))
        .unwrap_or_else(|| "Unknown Artist".to_string());

    let rating = entry.get("rating").and_then(Value::as_f64).unwrap_or(0.0);
    let votes = entry.get("votes").and_then(Value::as_u64).unwrap_or(0);
    let (kind, signal) = if official {
        (ResultKind::Official, "Official version".to_string())
    } else if votes > 0 {
        (ResultKind::Chords, format!("rating {rating:.1} ({votes} votes)"))
    } else {
        (ResultKind::Chords, String::new())
    };

    Some((
        rating,
        ResultStub::new(title, artist, url.as_str(), kind, signal, NAME),
    ))
}

#[async_trait::async_trait]
impl SiteAdapter for UltimateGuitar {
    fn name(&self) -> &'static str {
        NAME
    }

    fn family(&self) -> Script {
        Script::Other
    }

    fn handles(&self, url: &Url) -> bool {
        on_domain(url, DOMAIN)
    }

    fn search_url(&self, query: &Query) -> Result<Url, ChordError> {
        let mut url = self
            .base
            .join("search.php")
            .map_err(|e| ChordError::Config(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("search_type", "title")
            .append_pair("value", query.raw());
        Ok(url)
    }

    fn parse_results(&self, html: &str) -> Result<Vec<ResultStub>, ChordError> {
        let store = embedded::parse_store(html);
        let listed = store.as_ref().and_then(embedded::search_results);

        if let Some(results) = listed {
            let stubs = parse_embedded(results, &self.base);
            if !stubs.is_empty() {
                return Ok(stubs);
            }
        }

        let doc = Html::parse_document(html);
        match self.parse_rows(&doc) {
            Some(stubs) => Ok(stubs),
            None if listed.is_some() => Ok(Vec::new()),
            None => Err(ChordError::UnrecognizedStructure(
                "no embedded results and no result rows".into(),
            )),
        }
    }

    fn search_source(&self) -> &dyn PageSource {
        self.search_source.as_ref()
    }

    fn extractor(&self) -> &ContentExtractor {
        &self.extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::model::QualityTier;
    use async_trait::async_trait;

    struct NoFetch;

    #[async_trait]
    impl PageSource for NoFetch {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            Err(FetchError::Network(format!("unexpected fetch of {url}")))
        }

        fn transport(&self) -> &'static str {
            "none"
        }
    }

    fn adapter() -> UltimateGuitar {
        let source: Arc<dyn PageSource> = Arc::new(NoFetch);
        UltimateGuitar::new(source.clone(), ContentExtractor::new(source)).unwrap()
    }

    const ROWS: &str = r##"
        <div class="dyhP1"><div class="SUEyv">ARTIST</div><div class="SGCxQ">SONG</div><div>TYPE</div></div>
        <div class="dyhP1">
          <div class="SUEyv"><a href="https://www.ultimate-guitar.com/artist/oasis_6895">Oasis</a></div>
          <div class="SGCxQ"><a tabcount="1" href="https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-27596">Wonderwall</a></div>
          <div>Chords</div>
        </div>
        <div class="dyhP1">
          <div class="SUEyv"></div>
          <div class="SGCxQ"><a tabcount="1" href="#" data-url="/tab/oasis/wonderwall-official-1956589">Wonderwall
            <span data-tip="Official version"><svg><path fill="#00E148"></path></svg></span></a></div>
          <div>Official</div>
        </div>
        <div class="dyhP1">
          <div class="SUEyv"><a href="/artist/ryan_adams_1">Ryan Adams</a></div>
          <div class="SGCxQ"><a tabcount="1" href="/tab/ryan-adams/wonderwall-tabs-98">Wonderwall</a></div>
          <div><span class="D8BqY">High quality</span> Tab</div>
        </div>
        <div class="dyhP1">
          <div class="SGCxQ"><a href="#">Broken</a></div>
        </div>
    "##;

    #[test]
    fn rows_skip_header_and_unresolvable_links() {
        let stubs = adapter().parse_results(ROWS).unwrap();
        assert_eq!(stubs.len(), 3);
        assert!(stubs.iter().all(|s| s.title != "SONG" && s.title != "Broken"));
    }

    #[test]
    fn rows_recover_artist_from_slug_and_data_url() {
        let stubs = adapter().parse_results(ROWS).unwrap();
        let official = &stubs[1];
        assert_eq!(official.artist, "Oasis");
        assert_eq!(
            official.source_url,
            "https://www.ultimate-guitar.com/tab/oasis/wonderwall-official-1956589"
        );
        assert_eq!(official.kind, ResultKind::Official);
        assert_eq!(official.tier, QualityTier::Official);
        assert_eq!(official.title, "Wonderwall");
    }

    #[test]
    fn rows_read_quality_label_and_type() {
        let stubs = adapter().parse_results(ROWS).unwrap();
        let ryan = &stubs[2];
        assert_eq!(ryan.artist, "Ryan Adams");
        assert_eq!(ryan.quality_signal, "High quality");
        assert_eq!(ryan.tier, QualityTier::Annotated);
        assert_eq!(ryan.kind, ResultKind::Tab);
        assert_eq!(stubs[0].tier, QualityTier::Unannotated);
    }

    fn store_page(results: &str) -> String {
        let json = format!(r#"{{"store":{{"page":{{"data":{{"results":{results}}}}}}}}}"#);
        let escaped = json.replace('&', "&amp;").replace('"', "&quot;");
        format!(r#"<html><body><div class="js-store" data-content="{escaped}"></div></body></html>"#)
    }

    #[test]
    fn embedded_results_filter_and_sort_by_rating() {
        let html = store_page(
            r#"[
              {"song_name":"Wonderwall","artist_name":"Oasis","type":"Tabs","rating":4.9,"votes":900,"tab_url":"https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-tabs-1"},
              {"song_name":"Wonderwall","artist_name":"Oasis","type":"Chords","rating":4.1,"votes":12,"tab_url":"https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-2"},
              {"song_name":"Wonderwall","artist_name":"Oasis","type":"Chords","rating":4.8,"votes":3000,"tab_url":"https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-3"},
              {"song_name":"Wonderwall","artist_name":"Oasis","type":"Official","rating":0,"tab_url":"https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-official-4"},
              {"song_name":"Wonderwall","type":"Chords","tab_url":"/tab/ryan-adams/wonderwall-chords-5"}
            ]"#,
        );
        let stubs = adapter().parse_results(&html).unwrap();
        let urls: Vec<_> = stubs.iter().map(|s| s.source_url.rsplit('-').next().unwrap()).collect();
        assert_eq!(urls, vec!["3", "2", "4", "5"]);
        assert_eq!(stubs[3].artist, "Ryan Adams");
        assert_eq!(stubs[0].quality_signal, "rating 4.8 (3000 votes)");
    }

    #[test]
    fn empty_embedded_list_is_not_an_error() {
        let stubs = adapter().parse_results(&store_page("[]")).unwrap();
        assert!(stubs.is_empty());
    }

    #[test]
    fn unknown_page_is_unrecognized() {
        let err = adapter().parse_results("<html><p>captcha</p></html>").unwrap_err();
        assert!(matches!(err, ChordError::UnrecognizedStructure(_)));
    }

    #[test]
    fn search_url_encodes_query() {
        let q = Query::parse("wonderwall oasis").unwrap();
        let url = adapter().search_url(&q).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.ultimate-guitar.com/search.php?search_type=title&value=wonderwall+oasis"
        );
    }

    #[test]
    fn handles_tab_subdomain_only() {
        let a = adapter();
        assert!(a.handles(&Url::parse("https://tabs.ultimate-guitar.com/tab/x/y-1").unwrap()));
        assert!(!a.handles(&Url::parse("https://amdm.ru/akkordi/x/").unwrap()));
    }
}
