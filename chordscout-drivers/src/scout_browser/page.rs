use crate::scout_browser::{
    behavioral::{BehavioralEngine, PacingPlan},
    fingerprint::UserAgentProfile,
    stealth::StealthScripts,
};
use anyhow::Result;
use chordscout_common::StealthLevel;
use fantoccini::Client;
use serde_json::json;
use tracing::debug;

const POINTER_SCRIPT: &str = r#"
    const [x, y] = arguments;
    const target = document.elementFromPoint(x, y) || document.body;
    if (target) {
        target.dispatchEvent(new MouseEvent('mousemove', {
            clientX: x, clientY: y, bubbles: true, cancelable: true, view: window
        }));
    }
    return true;
"#;

const SCROLL_SCRIPT: &str = r#"
    const [step, pauseMs, maxSteps] = arguments;
    const done = arguments[arguments.length - 1];
    const limit = Math.floor(document.body.scrollHeight / 2);
    let scrolled = 0;
    let steps = 0;
    const timer = setInterval(() => {
        window.scrollBy(0, step);
        scrolled += step;
        steps += 1;
        if (scrolled >= limit || steps >= maxSteps) {
            clearInterval(timer);
            done(scrolled);
        }
    }, pauseMs);
"#;

/// Page wrapper that navigates with stealth and reads like a person would.
pub struct ScoutPage {
    pub(crate) client: Client,
    pub(crate) stealth: StealthLevel,
    pub(crate) profile: UserAgentProfile,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl ScoutPage {
    pub fn new(
        client: Client,
        stealth: StealthLevel,
        profile: UserAgentProfile,
        behavioral_engine: BehavioralEngine,
    ) -> Self {
        Self {
            client,
            stealth,
            profile,
            behavioral_engine,
        }
    }

    /// Pause per `plan`, navigate to `url`, and apply stealth scripts.
    pub async fn goto(&mut self, url: &str, plan: &PacingPlan) -> Result<()> {
        self.behavioral_engine.pause(plan.before_navigation).await;
        debug!(target: "browser.session", %url, "navigating");
        self.client.goto(url).await.map_err(anyhow::Error::from)?;
        self.apply_stealth().await?;
        Ok(())
    }

    async fn apply_stealth(&mut self) -> Result<()> {
        for script in StealthScripts::for_level(self.stealth) {
            self.client.execute(script, vec![]).await?;
        }
        if self.stealth == StealthLevel::Maximum {
            self.client
                .execute(&StealthScripts::platform_override(&self.profile), vec![])
                .await?;
        }
        Ok(())
    }

    /// Wait, move the pointer twice, then scroll toward the middle of the page.
    pub async fn simulate_reading(&self, plan: &PacingPlan) -> Result<()> {
        self.behavioral_engine.pause(plan.after_load).await;

        self.move_pointer(plan.first_pointer).await?;
        self.behavioral_engine.pause(plan.after_first_pointer).await;

        self.move_pointer(plan.second_pointer).await?;
        self.behavioral_engine.pause(plan.after_second_pointer).await;

        if plan.max_scroll_steps > 0 {
            let scrolled = self
                .client
                .execute_async(
                    SCROLL_SCRIPT,
                    vec![
                        json!(plan.scroll_step_px),
                        json!(plan.scroll_step_ms),
                        json!(plan.max_scroll_steps),
                    ],
                )
                .await?;
            debug!(target: "browser.session", scrolled = %scrolled, "scrolled page");
        }
        self.behavioral_engine.pause(plan.after_scroll).await;
        Ok(())
    }

    async fn move_pointer(&self, (x, y): (i64, i64)) -> Result<()> {
        self.client
            .execute(POINTER_SCRIPT, vec![json!(x), json!(y)])
            .await?;
        Ok(())
    }

    /// Return the full page HTML source.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }
}
