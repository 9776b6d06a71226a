use chordscout_common::{ChordError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::guidance;

/// Writing system of a query, used to pick the adapter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Cyrillic,
    Other,
}

/// A caller's search string together with its classified script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    script: Script,
}

impl Query {
    /// Trim and classify `raw`. Blank input is an [`ChordError::InvalidInput`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChordError::InvalidInput("query is required".into()));
        }
        Ok(Self {
            raw: trimmed.to_string(),
            script: crate::router::classify_script(trimmed),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn script(&self) -> Script {
        self.script
    }
}

/// What kind of sheet a result points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Chords,
    Tab,
    Official,
    Ukulele,
    Bass,
    GuitarPro,
    Search,
}

impl ResultKind {
    /// Kind from a result row's visible text. Order matters: a "Guitar Pro"
    /// row also says "Tab", and official rows can mention anything.
    pub fn classify(text: &str) -> Self {
        if text.contains("Official") {
            Self::Official
        } else if text.contains("Tab") && !text.contains("Guitar Pro") {
            Self::Tab
        } else if text.contains("Ukulele") {
            Self::Ukulele
        } else if text.contains("Bass") {
            Self::Bass
        } else if text.contains("Guitar Pro") {
            Self::GuitarPro
        } else {
            Self::Chords
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Chords => "Chords",
            Self::Tab => "Tab",
            Self::Official => "Official",
            Self::Ukulele => "Ukulele",
            Self::Bass => "Bass",
            Self::GuitarPro => "Guitar Pro",
            Self::Search => "Search",
        };
        f.write_str(label)
    }
}

/// Ranking bucket derived from a result's quality signal.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Unannotated < Annotated < Official`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Unannotated,
    Annotated,
    Official,
}

impl QualityTier {
    pub fn from_signal(signal: &str, kind: ResultKind) -> Self {
        let signal = signal.trim();
        if kind == ResultKind::Official || signal.to_lowercase().contains("official") {
            Self::Official
        } else if !signal.is_empty() {
            Self::Annotated
        } else {
            Self::Unannotated
        }
    }
}

/// A search hit before any content has been fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultStub {
    pub title: String,
    pub artist: String,
    pub source_url: String,
    pub kind: ResultKind,
    pub quality_signal: String,
    pub source: String,
    pub tier: QualityTier,
    pub extractable: bool,
}

impl ResultStub {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        source_url: impl Into<String>,
        kind: ResultKind,
        quality_signal: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let quality_signal = quality_signal.into();
        let tier = QualityTier::from_signal(&quality_signal, kind);
        Self {
            title: title.into(),
            artist: artist.into(),
            source_url: source_url.into(),
            kind,
            quality_signal,
            source: source.into(),
            tier,
            extractable: true,
        }
    }

    /// A link the user has to follow by hand.
    pub fn manual(
        title: impl Into<String>,
        artist: impl Into<String>,
        source_url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            extractable: false,
            ..Self::new(title, artist, source_url, ResultKind::Search, "", source)
        }
    }
}

/// Why a fetch did not yield a page to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    TookTooLong,
    Protected,
}

/// Result of trying to pull chord text out of one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Success { text: String },
    NotDirectPage,
    NotFound,
    Blocked { reason: BlockReason },
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            _ => None,
        }
    }

    /// Text to show the user: the chord sheet itself or a reason it is missing.
    pub fn into_content(self) -> ChordContent {
        let text = match self {
            Self::Success { text } => text,
            Self::NotDirectPage => guidance::LISTING_PAGE.to_string(),
            Self::NotFound => guidance::NOT_FOUND.to_string(),
            Self::Blocked {
                reason: BlockReason::TookTooLong,
            } => guidance::TOOK_TOO_LONG.to_string(),
            Self::Blocked {
                reason: BlockReason::Protected,
            } => guidance::PROTECTED.to_string(),
        };
        ChordContent { text }
    }
}

/// A ranked entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    #[serde(flatten)]
    pub stub: ResultStub,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub rank: u32,
}

/// Response of a single-URL extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordContent {
    pub text: String,
}
