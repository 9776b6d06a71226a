use crate::scout_browser::{
    behavioral::BehavioralEngine,
    fingerprint::{UserAgentManager, UserAgentProfile},
    page::ScoutPage,
    stealth::build_stealth_arguments,
};
use anyhow::Result;
use chordscout_common::StealthLevel;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use webdriver::capabilities::Capabilities;

/// How to reach and configure the WebDriver-controlled browser.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthLevel,
    pub page_load_timeout: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            stealth: StealthLevel::default(),
            page_load_timeout: Duration::from_secs(45),
        }
    }
}

/// Thin wrapper around a `fantoccini` WebDriver client with stealth and
/// behavioral helpers.
///
/// Dropping a driver that was never [`close`](Self::close)d ends its
/// WebDriver session from a background task on the current runtime.
pub struct ScoutDriver {
    pub client: Client,
    pub behavioral_engine: BehavioralEngine,
    pub profile: UserAgentProfile,
    pub stealth: StealthLevel,
    closed: bool,
}

/// Chrome capabilities for a session with the given fingerprint.
pub fn chrome_capabilities(opts: &DriverOptions, profile: &UserAgentProfile) -> Capabilities {
    let mut args = build_stealth_arguments(opts.stealth, profile);
    if opts.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }

    let mut chrome_opts = HashMap::new();
    chrome_opts.insert("args".to_string(), json!(args));
    chrome_opts.insert(
        "excludeSwitches".to_string(),
        json!(["enable-automation"]),
    );

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

impl ScoutDriver {
    /// Open a new session on the WebDriver service at `opts.webdriver_url`.
    pub async fn connect(opts: &DriverOptions) -> Result<Self> {
        let mut user_agent_manager = UserAgentManager::new();
        let profile = user_agent_manager.session_profile().clone();
        let caps = chrome_capabilities(opts, &profile);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&opts.webdriver_url)
            .await?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(opts.page_load_timeout),
                None,
            ))
            .await?;

        info!(
            target: "browser.session",
            webdriver = %opts.webdriver_url,
            headless = opts.headless,
            stealth = ?opts.stealth,
            "browser session opened"
        );

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            profile,
            stealth: opts.stealth,
            closed: false,
        })
    }

    /// A page handle sharing this driver's session.
    pub fn page(&self) -> ScoutPage {
        ScoutPage::new(
            self.client.clone(),
            self.stealth,
            self.profile.clone(),
            self.behavioral_engine.clone(),
        )
    }

    /// Close the underlying browser session.
    pub async fn close(mut self) -> Result<()> {
        let res = self.client.clone().close().await;
        self.closed = true;
        res?;
        info!(target: "browser.session", "browser session closed");
        Ok(())
    }
}

impl Drop for ScoutDriver {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(target: "browser.session", "driver dropped outside a runtime; session left open");
            return;
        };
        warn!(target: "browser.session", "driver dropped without close; closing in background");
        let client = self.client.clone();
        handle.spawn(async move {
            if let Err(err) = client.close().await {
                debug!(target: "browser.session", error = %err, "background close failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_flags() {
        let mut mgr = UserAgentManager::new();
        let profile = mgr.session_profile().clone();
        let caps = chrome_capabilities(&DriverOptions::default(), &profile);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));

        let headed = DriverOptions {
            headless: false,
            ..DriverOptions::default()
        };
        let caps = chrome_capabilities(&headed, &profile);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }
}
