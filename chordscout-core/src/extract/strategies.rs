use regex::Regex;
use std::sync::OnceLock;

use crate::dom::{self, Page};
use crate::embedded;

/// One way of locating chord text in a page.
pub trait ContentStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_extract(&self, page: &Page<'_>) -> Option<String>;
}

/// Selectors known to wrap the tab body on Ultimate Guitar.
pub const ULTIMATE_GUITAR_SELECTORS: &[&str] = &[
    r#"pre[class*="js-tab-content"]"#,
    r#"[data-name="tab-content"] pre"#,
    ".js-tab-content pre",
    "pre.ZGNwb",
    r#"code[class*="code"]"#,
];

/// Selectors used by Russian chord archives (AMDM and similar).
pub const CYRILLIC_SITE_SELECTORS: &[&str] =
    &[".song_text", ".chord_text", ".song-text", ".b-podbor__text"];

fn markup_tokens() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[/?(?:ch|tab)\]").ok()).as_ref()
}

/// Remove `[ch]`/`[tab]` markers and normalize line endings.
pub fn strip_tab_markup(content: &str) -> String {
    let unix = content.replace("\r\n", "\n").replace('\r', "\n");
    match markup_tokens() {
        Some(re) => re.replace_all(&unix, "").into_owned(),
        None => unix,
    }
}

/// Tab body from the page's embedded JSON store.
pub struct EmbeddedTabContent;

impl ContentStrategy for EmbeddedTabContent {
    fn name(&self) -> &'static str {
        "embedded_state"
    }

    fn try_extract(&self, page: &Page<'_>) -> Option<String> {
        let store = embedded::parse_store(page.raw)?;
        let content = embedded::wiki_tab_content(&store)?;
        let text = strip_tab_markup(content);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// First match of each selector in order; the first long enough wins.
pub struct SelectorList {
    name: &'static str,
    selectors: Vec<String>,
    min_chars: usize,
}

impl SelectorList {
    pub fn new(name: &'static str, selectors: &[&str], min_chars: usize) -> Self {
        Self {
            name,
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            min_chars,
        }
    }
}

impl ContentStrategy for SelectorList {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_extract(&self, page: &Page<'_>) -> Option<String> {
        self.selectors.iter().find_map(|css| {
            let sel = dom::selector(css)?;
            let el = page.dom.select(&sel).next()?;
            long_enough(dom::text_content(el), self.min_chars)
        })
    }
}

/// Any `<pre>` block with enough text.
pub struct GenericPre {
    min_chars: usize,
}

impl GenericPre {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl ContentStrategy for GenericPre {
    fn name(&self) -> &'static str {
        "generic_pre"
    }

    fn try_extract(&self, page: &Page<'_>) -> Option<String> {
        let sel = dom::selector("pre")?;
        page.dom
            .select(&sel)
            .find_map(|el| long_enough(dom::text_content(el), self.min_chars))
    }
}

fn long_enough(text: String, min_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    (trimmed.chars().count() > min_chars).then(|| trimmed.to_string())
}

/// Embedded state, then site containers, then any `<pre>`.
pub fn default_strategies(min_chars: usize) -> Vec<Box<dyn ContentStrategy>> {
    vec![
        Box::new(EmbeddedTabContent),
        Box::new(SelectorList::new(
            "ultimate_guitar_containers",
            ULTIMATE_GUITAR_SELECTORS,
            min_chars,
        )),
        Box::new(SelectorList::new(
            "cyrillic_site_containers",
            CYRILLIC_SITE_SELECTORS,
            min_chars,
        )),
        Box::new(GenericPre::new(min_chars)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSE: &str = "Em7  G  Dsus4  A7sus4\nToday is gonna be the day that they're gonna throw it back to you";

    #[test]
    fn strips_markup_and_carriage_returns() {
        let raw = "[tab][ch]Em7[/ch] [ch]G[/ch]\r\nToday is gonna be[/tab]\rthe day";
        assert_eq!(strip_tab_markup(raw), "Em7 G\nToday is gonna be\nthe day");
    }

    #[test]
    fn short_containers_are_skipped() {
        let html = format!(
            r#"<div class="song_text">short</div><pre class="ZGNwb">{VERSE}</pre>"#
        );
        let page = Page::parse(&html);
        let s = SelectorList::new("t", &[".song_text", "pre.ZGNwb"], 50);
        assert_eq!(s.try_extract(&page).as_deref(), Some(VERSE));
    }

    #[test]
    fn selector_order_is_priority_order() {
        let html = format!(
            r#"<pre>{VERSE} (plain)</pre><div class="b-podbor__text">{VERSE} (podbor)</div>"#
        );
        let page = Page::parse(&html);
        let s = SelectorList::new("t", CYRILLIC_SITE_SELECTORS, 50);
        assert!(s.try_extract(&page).unwrap().ends_with("(podbor)"));
    }

    #[test]
    fn generic_pre_takes_first_long_block() {
        let html = format!("<pre>tiny</pre><pre>  {VERSE}  </pre>");
        let page = Page::parse(&html);
        assert_eq!(GenericPre::new(50).try_extract(&page).as_deref(), Some(VERSE));
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        // 30 Cyrillic letters = 60 bytes but only 30 chars
        let html = format!("<pre>{}</pre>", "ж".repeat(30));
        let page = Page::parse(&html);
        assert!(GenericPre::new(50).try_extract(&page).is_none());
    }
}
