//! Merge adapter output into the ranked list returned to callers.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::adapters::ultimate_guitar;
use crate::embedded::decode_entities;
use crate::model::{NormalizedResult, Query, ResultStub};

const CHORDIFY_SEARCH: &str = "https://chordify.net/search/";

fn residual_tag() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").ok()).as_ref()
}

fn clean_pass(text: &str) -> String {
    let unix = text.replace("\r\n", "\n").replace('\r', "\n");
    let untagged = match residual_tag() {
        Some(re) => re.replace_all(&unix, "").into_owned(),
        None => unix,
    };
    decode_entities(&untagged)
}

/// Strip tags, decode entities and normalize line endings until the text
/// stops changing, then trim.
pub fn clean_text(text: &str) -> String {
    // A pass that changes anything either shortens the text or removes a
    // carriage return, so this reaches a fixpoint.
    let mut current = text.to_string();
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current.trim().to_string();
        }
        current = next;
    }
}

/// Manual search links offered when no adapter found anything.
pub fn fallback_stubs(query: &Query) -> Vec<ResultStub> {
    let q = query.raw();
    let mut stubs = Vec::with_capacity(2);

    if let Ok(mut ug) = Url::parse(ultimate_guitar::BASE).and_then(|b| b.join("search.php")) {
        ug.query_pairs_mut()
            .append_pair("search_type", "title")
            .append_pair("value", q);
        stubs.push(ResultStub::manual(
            format!("Search \"{q}\" on Ultimate Guitar"),
            "External Link",
            ug.as_str(),
            ultimate_guitar::NAME,
        ));
    }

    if let Ok(mut chordify) = Url::parse(CHORDIFY_SEARCH) {
        if let Ok(mut segments) = chordify.path_segments_mut() {
            segments.pop_if_empty().push(q);
        }
        stubs.push(ResultStub::manual(
            format!("Search \"{q}\" on Chordify"),
            "External Link",
            chordify.as_str(),
            "Chordify",
        ));
    }
    stubs
}

/// Dedupe by URL (first wins), attach cleaned text, and assign 1-based ranks.
///
/// Input order is kept: it already encodes adapter priority and per-adapter
/// quality. With no stubs at all, the manual fallback links are returned.
pub fn normalize(
    query: &Query,
    stubs: Vec<ResultStub>,
    texts: &HashMap<String, String>,
) -> Vec<NormalizedResult> {
    let stubs = if stubs.is_empty() {
        fallback_stubs(query)
    } else {
        stubs
    };

    let mut seen = HashSet::new();
    stubs
        .into_iter()
        .filter(|stub| seen.insert(stub.source_url.clone()))
        .enumerate()
        .map(|(idx, stub)| {
            let text = texts
                .get(&stub.source_url)
                .map(|t| clean_text(t))
                .filter(|t| !t.is_empty());
            NormalizedResult {
                stub,
                text,
                rank: idx as u32 + 1,
            }
        })
        .collect()
}

/// Split results back into `normalize` inputs.
pub fn into_inputs(results: Vec<NormalizedResult>) -> (Vec<ResultStub>, HashMap<String, String>) {
    let mut texts = HashMap::new();
    let stubs = results
        .into_iter()
        .map(|r| {
            if let Some(text) = r.text {
                texts.insert(r.stub.source_url.clone(), text);
            }
            r.stub
        })
        .collect();
    (stubs, texts)
}
