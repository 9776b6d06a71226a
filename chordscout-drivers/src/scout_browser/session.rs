//! One-shot page capture through a fresh browser session.
//!
//! Each capture launches its own session, visits one URL with the reading
//! rhythm from a [`PacingPlan`], and returns the page HTML. The session is
//! closed before returning; if the capture future is dropped or unwinds
//! instead, [`ScoutDriver`]'s drop closes it in the background.

use crate::scout_browser::{
    behavioral::PacingPlan,
    driver::{DriverOptions, ScoutDriver},
};
use anyhow::Result;
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{info, warn};

/// Longest we wait for the session to close once the capture is over.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Raised when a capture exceeds its time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimedOut(pub Duration);

impl fmt::Display for CaptureTimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page capture timed out after {:?}", self.0)
    }
}

impl std::error::Error for CaptureTimedOut {}

/// True if `err` came from a time budget running out, either ours or the
/// WebDriver page-load timeout.
pub fn is_timeout(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<CaptureTimedOut>().is_some() {
        return true;
    }
    err.chain().any(|cause| {
        let msg = cause.to_string().to_ascii_lowercase();
        msg.contains("timeout") || msg.contains("timed out")
    })
}

/// Visit `url` in a new browser session and return its HTML.
///
/// The whole call, connect through close, finishes within `budget`. Connect
/// and capture share one deadline; closing gets the remainder, at most
/// [`CLOSE_GRACE`] or a quarter of the budget.
pub async fn capture_html(
    opts: &DriverOptions,
    url: &str,
    plan: &PacingPlan,
    budget: Duration,
) -> Result<String> {
    let close_grace = CLOSE_GRACE.min(budget / 4);
    let deadline = Instant::now() + budget.saturating_sub(close_grace);

    let driver = match timeout_at(deadline, ScoutDriver::connect(opts)).await {
        Ok(driver) => driver?,
        Err(_) => {
            warn!(target: "browser.session", %url, budget_ms = budget.as_millis() as u64, "connect timed out");
            return Err(CaptureTimedOut(budget).into());
        }
    };

    let result = match timeout_at(deadline, visit(&driver, url, plan)).await {
        Ok(inner) => inner,
        Err(_) => {
            warn!(target: "browser.session", %url, budget_ms = budget.as_millis() as u64, "capture timed out");
            Err(CaptureTimedOut(budget).into())
        }
    };

    match timeout(close_grace, driver.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(target: "browser.session", error = %err, "failed to close browser session")
        }
        Err(_) => warn!(target: "browser.session", "session close overran; finishing in background"),
    }
    result
}

async fn visit(driver: &ScoutDriver, url: &str, plan: &PacingPlan) -> Result<String> {
    let mut page = driver.page();
    page.goto(url, plan).await?;
    page.simulate_reading(plan).await?;
    let html = page.get_content().await?;
    info!(
        target: "browser.session",
        %url,
        html_len = html.len(),
        "captured page"
    );
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_timeout_is_detected() {
        let err: anyhow::Error = CaptureTimedOut(Duration::from_secs(45)).into();
        assert!(is_timeout(&err));
    }

    #[test]
    fn webdriver_timeout_text_is_detected() {
        let err = anyhow::anyhow!("timeout: Timed out receiving message from renderer");
        assert!(is_timeout(&err));
        let err = anyhow::anyhow!("unknown error: net::ERR_CONNECTION_REFUSED");
        assert!(!is_timeout(&err));
    }

    #[tokio::test]
    async fn unreachable_webdriver_is_an_error() {
        let opts = DriverOptions {
            webdriver_url: "http://127.0.0.1:9".to_string(),
            ..DriverOptions::default()
        };
        let result = capture_html(
            &opts,
            "https://amdm.ru/",
            &PacingPlan::instant(),
            Duration::from_secs(5),
        )
        .await;
        assert!(result.is_err());
    }
}
