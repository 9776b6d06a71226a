use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

/// Inclusive millisecond range for a randomized pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Pick a duration inside the range. Reversed bounds are swapped.
    pub fn sample(&self) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(OsRng.gen_range(lo..=hi))
    }
}

/// Pauses and gestures performed around a single page visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingPlan {
    pub before_navigation: DelayRange,
    pub after_load: DelayRange,
    pub first_pointer: (i64, i64),
    pub after_first_pointer: DelayRange,
    pub second_pointer: (i64, i64),
    pub after_second_pointer: DelayRange,
    /// Pixels per scroll step.
    pub scroll_step_px: u32,
    /// Pause between scroll steps.
    pub scroll_step_ms: u64,
    /// Upper bound on scroll steps so very long pages don't stall the visit.
    pub max_scroll_steps: u32,
    pub after_scroll: DelayRange,
}

impl Default for PacingPlan {
    fn default() -> Self {
        Self {
            before_navigation: DelayRange::new(1_000, 3_000),
            after_load: DelayRange::new(2_000, 4_000),
            first_pointer: (100, 100),
            after_first_pointer: DelayRange::new(500, 1_000),
            second_pointer: (300, 400),
            after_second_pointer: DelayRange::new(300, 800),
            scroll_step_px: 100,
            scroll_step_ms: 100,
            max_scroll_steps: 40,
            after_scroll: DelayRange::new(1_000, 2_000),
        }
    }
}

impl PacingPlan {
    /// A plan with no pauses, for tests and local fixtures.
    pub fn instant() -> Self {
        let zero = DelayRange::new(0, 0);
        Self {
            before_navigation: zero,
            after_load: zero,
            after_first_pointer: zero,
            after_second_pointer: zero,
            scroll_step_ms: 0,
            max_scroll_steps: 0,
            after_scroll: zero,
            ..Self::default()
        }
    }

    /// Worst-case time spent pausing, excluding page load itself.
    pub fn max_total(&self) -> Duration {
        let ranges = [
            self.before_navigation,
            self.after_load,
            self.after_first_pointer,
            self.after_second_pointer,
            self.after_scroll,
        ];
        let pauses: u64 = ranges.iter().map(|r| r.min_ms.max(r.max_ms)).sum();
        let scrolling = self.scroll_step_ms * u64::from(self.max_scroll_steps);
        Duration::from_millis(pauses + scrolling)
    }
}

#[derive(Debug, Clone, Default)]
/// Produces human-like delays to reduce automation signals.
pub struct BehavioralEngine {}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Sleep for a duration sampled from `range`.
    pub async fn pause(&self, range: DelayRange) {
        let dur = range.sample();
        if !dur.is_zero() {
            sleep(dur).await;
        }
    }
}
