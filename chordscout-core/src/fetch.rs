//! Page transports: plain HTTP or a rendered browser session.
//!
//! Each [`PageSource`] owns its own time bound. The browser transport closes
//! its session after the bound fires.

use async_trait::async_trait;
use chordscout_common::ChordError;
use chordscout_config::{BrowserSettings, HttpSettings};
use chordscout_drivers::scout_browser::{
    behavioral::PacingPlan,
    driver::DriverOptions,
    session::{self, capture_html},
};
use chordscout_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("browser error: {0}")]
    Browser(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

impl From<FetchError> for ChordError {
    fn from(err: FetchError) -> Self {
        ChordError::SourceUnavailable(err.to_string())
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(d) => FetchError::TimedOut(d),
            HttpError::Status { status, .. } => FetchError::Status(status.as_u16()),
            other => FetchError::Network(other.to_string()),
        }
    }
}

/// Something that can turn a URL into HTML.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;

    /// Short label for logs.
    fn transport(&self) -> &'static str;
}

/// Plain HTTP GET with browser-like headers.
pub struct HttpPageSource {
    client: HttpClient,
}

impl HttpPageSource {
    /// `base` anchors the client; fetches always use absolute URLs.
    pub fn new(base: &str, settings: &HttpSettings) -> Result<Self, ChordError> {
        let client = HttpClient::with_user_agent(base, &settings.user_agent)
            .map_err(|e| ChordError::Config(e.to_string()))?
            .with_timeout(Duration::from_secs(settings.timeout_secs))
            .with_retries(settings.retries);
        Ok(Self { client })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        Ok(self.client.get_text(url.as_str(), opts).await?)
    }

    fn transport(&self) -> &'static str {
        "http"
    }
}

/// Fresh WebDriver session per fetch, paced like a person reading.
pub struct BrowserPageSource {
    options: DriverOptions,
    plan: PacingPlan,
    budget: Duration,
}

impl BrowserPageSource {
    pub fn new(settings: &BrowserSettings, budget: Duration) -> Self {
        Self {
            options: DriverOptions {
                webdriver_url: settings.webdriver_url.clone(),
                headless: settings.headless,
                stealth: settings.stealth,
                page_load_timeout: budget,
            },
            plan: PacingPlan::default(),
            budget,
        }
    }

    pub fn with_plan(mut self, plan: PacingPlan) -> Self {
        self.plan = plan;
        self
    }
}

#[async_trait]
impl PageSource for BrowserPageSource {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        capture_html(&self.options, url.as_str(), &self.plan, self.budget)
            .await
            .map_err(|err| {
                if session::is_timeout(&err) {
                    FetchError::TimedOut(self.budget)
                } else {
                    FetchError::Browser(format!("{err:#}"))
                }
            })
    }

    fn transport(&self) -> &'static str {
        "browser"
    }
}
