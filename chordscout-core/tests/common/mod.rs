#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use chordscout_common::observability::{LogConfig, LogFormat};
use chordscout_core::fetch::{FetchError, PageSource};
use url::Url;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "chordscout-tests",
            log_dir: Some(std::env::temp_dir().join("chordscout-tests")),
            emit_stderr: true,
            format: if std::env::var("CHORDSCOUT_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        chordscout_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub const UG_SEARCH: &str = include_str!("../fixtures/ug_search_wonderwall.html");
pub const UG_TAB: &str = include_str!("../fixtures/ug_tab_wonderwall.html");
pub const AMDM_SEARCH: &str = include_str!("../fixtures/amdm_search_kino.html");
pub const AMDM_SONG: &str = include_str!("../fixtures/amdm_song_gruppa_krovi.html");
pub const UNKNOWN_LAYOUT: &str = include_str!("../fixtures/unknown_layout.html");

#[derive(Clone)]
pub enum Canned {
    Page(&'static str),
    TimedOut,
    Refused,
}

/// In-memory transport serving canned pages by exact URL.
#[derive(Default)]
pub struct FixtureSource {
    pages: HashMap<String, Canned>,
    requested: Mutex<Vec<String>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, canned: Canned) -> Self {
        self.pages.insert(url.to_string(), canned);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageSource for FixtureSource {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        if let Ok(mut log) = self.requested.lock() {
            log.push(url.to_string());
        }
        match self.pages.get(url.as_str()) {
            Some(Canned::Page(html)) => Ok(html.to_string()),
            Some(Canned::TimedOut) => Err(FetchError::TimedOut(Duration::from_secs(45))),
            Some(Canned::Refused) => Err(FetchError::Status(403)),
            None => Err(FetchError::Status(404)),
        }
    }

    fn transport(&self) -> &'static str {
        "fixture"
    }
}
