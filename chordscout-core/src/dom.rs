use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector, logging instead of panicking on a bad one.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(err) => {
            tracing::warn!(target: "chords.extract", %css, error = ?err, "invalid css selector");
            None
        }
    }
}

/// Concatenated text of an element and its descendants, like `textContent`.
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// `text_content` with whitespace runs collapsed to single spaces.
pub fn inline_text(el: ElementRef<'_>) -> String {
    text_content(el).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First element in `scope` matching `css`.
pub fn first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    scope.select(&sel).next()
}

/// A parsed page together with its raw source.
///
/// Some strategies need the raw markup (embedded JSON located by regex),
/// others the DOM.
pub struct Page<'a> {
    pub raw: &'a str,
    pub dom: Html,
}

impl<'a> Page<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            dom: Html::parse_document(raw),
        }
    }
}
