//! AMDM.ru: Cyrillic chord archive.
//!
//! Search results are `.search_result` blocks whose first link reads
//! "Artist - Song". Song URLs look like `/akkordi/<artist>/<id>/<song>/`, so
//! either name can be recovered from the path when the link text lacks it.

use std::sync::Arc;

use chordscout_common::ChordError;
use scraper::Html;
use url::Url;

use super::{SiteAdapter, absolutize, artist_from_slug, on_domain, title_from_url};
use crate::dom::{self, first, inline_text};
use crate::extract::ContentExtractor;
use crate::fetch::PageSource;
use crate::model::{Query, ResultKind, ResultStub, Script};

pub const NAME: &str = "AMDM.ru";
pub const DOMAIN: &str = "amdm.ru";
pub const BASE: &str = "https://amdm.ru/";

pub struct Amdm {
    base: Url,
    search_source: Arc<dyn PageSource>,
    extractor: ContentExtractor,
}

impl Amdm {
    pub fn new(search_source: Arc<dyn PageSource>, extractor: ContentExtractor) -> Result<Self, ChordError> {
        let base = Url::parse(BASE).map_err(|e| ChordError::Config(e.to_string()))?;
        Ok(Self {
            base,
            search_source,
            extractor,
        })
    }
}

const UNKNOWN: &str = "Unknown";

/// "Кино - Группа крови" -> ("Кино", "Группа крови"). Extra separators stay
/// in the title.
pub fn split_artist_title(text: &str) -> Option<(String, String)> {
    let (artist, title) = text.split_once(" - ")?;
    let (artist, title) = (artist.trim(), title.trim());
    (!artist.is_empty() && !title.is_empty()).then(|| (artist.to_string(), title.to_string()))
}

/// Artist slug from `/akkordi/<artist>/...`.
fn artist_from_url(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    segments.by_ref().find(|s| *s == "akkordi")?;
    let artist = artist_from_slug(segments.next()?);
    (!artist.is_empty()).then_some(artist)
}

/// Artist and title from the link text, falling back to the URL path for
/// whichever part the text does not carry.
fn names_for(text: &str, url: &Url) -> (String, String) {
    if let Some(names) = split_artist_title(text) {
        return names;
    }
    let artist = artist_from_url(url).unwrap_or_else(|| UNKNOWN.to_string());
    let title = if text.is_empty() {
        title_from_url(url).unwrap_or_else(|| UNKNOWN.to_string())
    } else {
        text.to_string()
    };
    (artist, title)
}

#[async_trait::async_trait]
impl SiteAdapter for Amdm {
    fn name(&self) -> &'static str {
        NAME
    }

    fn family(&self) -> Script {
        Script::Cyrillic
    }

    fn handles(&self, url: &Url) -> bool {
        on_domain(url, DOMAIN)
    }

    fn search_url(&self, query: &Query) -> Result<Url, ChordError> {
        let mut url = self
            .base
            .join("search/")
            .map_err(|e| ChordError::Config(e.to_string()))?;
        url.query_pairs_mut().append_pair("q", query.raw());
        Ok(url)
    }

    fn parse_results(&self, html: &str) -> Result<Vec<ResultStub>, ChordError> {
        let doc = Html::parse_document(html);
        let Some(block_sel) = dom::selector(".search_result") else {
            return Ok(Vec::new());
        };

        let stubs = doc
            .select(&block_sel)
            .filter_map(|block| {
                let link = first(block, "a")?;
                let url = absolutize(&self.base, link.value().attr("href")?)?;
                let (artist, title) = names_for(&inline_text(link), &url);
                Some(ResultStub::new(
                    title,
                    artist,
                    url.as_str(),
                    ResultKind::Chords,
                    "",
                    NAME,
                ))
            })
            .collect();
        Ok(stubs)
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

    fn adapter() -> Amdm {
        let source: Arc<dyn PageSource> = Arc::new(NoFetch);
        Amdm::new(source.clone(), ContentExtractor::new(source)).unwrap()
    }

    #[test]
    fn splits_artist_and_title() {
        assert_eq!(
            split_artist_title("Кино - Группа крови"),
            Some(("Кино".to_string(), "Группа крови".to_string()))
        );
        assert_eq!(
            split_artist_title("ДДТ - Что такое осень - live"),
            Some(("ДДТ".to_string(), "Что такое осень - live".to_string()))
        );
        assert_eq!(split_artist_title("Звезда по имени Солнце"), None);
        assert_eq!(split_artist_title(" - Пустышка"), None);
    }

    #[test]
    fn names_fall_back_to_url_path() {
        let url = Url::parse("https://amdm.ru/akkordi/kino/99/gruppa_krovi/").unwrap();
        assert_eq!(
            names_for("Группа крови", &url),
            ("Kino".to_string(), "Группа крови".to_string())
        );
        assert_eq!(names_for("", &url), ("Kino".to_string(), "Gruppa Krovi".to_string()));

        let elsewhere = Url::parse("https://amdm.ru/song/").unwrap();
        assert_eq!(names_for("Песня", &elsewhere), ("Unknown".to_string(), "Песня".to_string()));
    }

    #[test]
    fn parses_result_blocks() {
        let html = r##"
            <table>
              <tr class="search_result"><td><a href="/akkordi/kino/99/gruppa_krovi/">Кино - Группа крови</a></td></tr>
              <tr class="search_result"><td><a href="https://amdm.ru/akkordi/kino/100/pachka_sigaret/">Кино - Пачка сигарет</a></td></tr>
              <tr class="search_result"><td><a href="#">Кино - Пустышка</a></td></tr>
              <tr class="search_result"><td><a>Кино - Без ссылки</a></td></tr>
              <tr class="search_result"><td><a href="/akkordi/kino/101/zvezda_po_imeni_solnce/">Звезда по имени Солнце</a></td></tr>
              <tr class="search_result"><td><a href="/akkordi/kino/102/kukushka/"><img src="/i/play.png"></a></td></tr>
            </table>"##;
        let stubs = adapter().parse_results(html).unwrap();
        assert_eq!(stubs.len(), 4);
        assert_eq!(stubs[0].artist, "Кино");
        assert_eq!(stubs[0].title, "Группа крови");
        assert_eq!(stubs[0].source_url, "https://amdm.ru/akkordi/kino/99/gruppa_krovi/");
        assert_eq!(stubs[1].source, NAME);

        // no separator: artist comes from the path, title from the text
        assert_eq!(stubs[2].artist, "Kino");
        assert_eq!(stubs[2].title, "Звезда по имени Солнце");
        // no text at all: both come from the path
        assert_eq!(stubs[3].artist, "Kino");
        assert_eq!(stubs[3].title, "Kukushka");
        assert_eq!(stubs[3].source_url, "https://amdm.ru/akkordi/kino/102/kukushka/");
    }

    #[test]
    fn search_url_carries_cyrillic_query() {
        let q = Query::parse("Кино").unwrap();
        let url = adapter().search_url(&q).unwrap();
        assert_eq!(url.path(), "/search/");
        assert_eq!(url.query_pairs().next().unwrap().1, "Кино");
    }
}
