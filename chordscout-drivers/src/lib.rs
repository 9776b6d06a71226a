//! Driver layer for browser-backed page capture.
//!
//! This crate exposes the WebDriver session used when a chord site refuses
//! plain HTTP clients, plus the pacing and stealth helpers that make that
//! session look like a person reading a page.
//!
//! - [`scout_browser::driver::ScoutDriver`]: WebDriver client wrapper
//! - [`scout_browser::page::ScoutPage`]: navigation, pacing, and HTML capture
//! - [`scout_browser::behavioral::BehavioralEngine`]: human-like timings
//! - [`scout_browser::stealth`]: Chrome arguments and JS evasions per level
//! - [`scout_browser::session`]: one-shot capture that always closes the browser
pub mod scout_browser;
