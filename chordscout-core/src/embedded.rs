//! Serialized page state embedded in HTML attributes.
//!
//! Ultimate Guitar ships its page data as JSON inside
//! `<div class="js-store" data-content="...">`, HTML-escaped. These helpers
//! find that attribute, undo the escaping, and parse it.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn store_marker() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)class="js-store"[^>]*?data-content="([^"]*)""#).ok()
    })
    .as_ref()
}

fn any_data_content() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)data-content="([^"]*)""#).ok())
        .as_ref()
}

/// Undo the HTML entity escaping used inside attribute values.
///
/// `&amp;` is decoded last so that `&amp;quot;` yields `&quot;` rather than `"`.
pub fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// The raw, still-escaped `data-content` payload, preferring the `js-store` node.
pub fn find_data_content(html: &str) -> Option<&str> {
    if let Some(caps) = store_marker().and_then(|re| re.captures(html)) {
        return caps.get(1).map(|m| m.as_str());
    }
    any_data_content()
        .and_then(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decoded and parsed embedded store, if the page has one.
pub fn parse_store(html: &str) -> Option<Value> {
    let raw = find_data_content(html)?;
    let decoded = decode_entities(raw);
    match serde_json::from_str(&decoded) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::debug!(target: "chords.extract", error = %err, "embedded store is not valid JSON");
            None
        }
    }
}

/// Search results list at `store.page.data.results`.
pub fn search_results(store: &Value) -> Option<&Vec<Value>> {
    store.pointer("/store/page/data/results")?.as_array()
}

/// Tab body from `store.page.data.tab_view.wiki_tab.content`, or from the
/// first `wiki_tab` object found anywhere in the tree.
pub fn wiki_tab_content(store: &Value) -> Option<&str> {
    if let Some(s) = store
        .pointer("/store/page/data/tab_view/wiki_tab/content")
        .and_then(Value::as_str)
    {
        return Some(s);
    }
    find_wiki_tab(store)
}

fn find_wiki_tab(v: &Value) -> Option<&str> {
    match v {
        Value::Object(map) => {
            if let Some(content) = map
                .get("wiki_tab")
                .and_then(|w| w.get("content"))
                .and_then(Value::as_str)
            {
                return Some(content);
            }
            map.values().find_map(find_wiki_tab)
        }
        Value::Array(items) => items.iter().find_map(find_wiki_tab),
        _ => None,
    }
}
