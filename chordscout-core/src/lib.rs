//! Chord search core: routing, site adapters, content extraction, and ranking.
//!
//! A query flows through four stages:
//!
//! 1. [`router::Router`] classifies the query script and picks the adapter family.
//! 2. [`adapters::SiteAdapter`] implementations turn the query into [`model::ResultStub`]s.
//! 3. [`extract::ContentExtractor`] turns a result URL into chord text.
//! 4. [`normalize::normalize`] dedupes, cleans, and ranks the merged list.
//!
//! [`service::ChordService`] wires the stages together and is the entry point
//! used by the CLI. Song persistence lives behind the [`songs::SongStore`] trait.

pub mod adapters;
pub mod dom;
pub mod embedded;
pub mod extract;
pub mod fetch;
pub mod guidance;
pub mod model;
pub mod normalize;
pub mod router;
pub mod service;
pub mod songs;

pub use model::{
    ChordContent, ExtractionOutcome, NormalizedResult, QualityTier, Query, ResultKind, ResultStub,
    Script,
};
pub use service::{ChordService, Extracted};
