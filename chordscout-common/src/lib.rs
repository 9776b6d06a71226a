//! Common types and utilities shared across chordscout crates.
//!
//! This crate defines the error taxonomy, browser stealth levels, and the
//! observability helpers used throughout the workspace. It is intentionally
//! lightweight so that every crate can depend on it without pulling in the
//! scraping stack.
//!
//! # Overview
//!
//! - [`ChordError`] and [`Result`]: shared error handling
//! - [`StealthLevel`]: how aggressively browser sessions hide automation
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use chordscout_common::{ChordError, StealthLevel};
//!
//! let err = ChordError::InvalidInput("query is required".into());
//! assert!(err.is_caller_error());
//! assert_eq!(StealthLevel::default(), StealthLevel::Balanced);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Browser automation stealth level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StealthLevel {
    Lightweight,
    #[default]
    Balanced,
    Maximum,
}

/// Error taxonomy for the chord search core.
///
/// Only [`ChordError::InvalidInput`] is meant to reach callers; the other
/// variants are raised inside adapters and the extractor and are converted to
/// empty result lists or guidance text at their own boundary.
#[derive(thiserror::Error, Debug)]
pub enum ChordError {
    /// A required field was missing or blank.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network failure or timeout while talking to a third-party site.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The page was fetched but no known content container matched.
    #[error("unrecognized page structure: {0}")]
    UnrecognizedStructure(String),

    /// The URL belongs to a domain no adapter supports.
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChordError {
    /// Whether the error should surface as a 4xx-equivalent caller error.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Convenient alias for results that use [`ChordError`].
pub type Result<T> = std::result::Result<T, ChordError>;
