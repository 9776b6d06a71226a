//! Song storage contract.
//!
//! The core never persists anything itself; the CLI pairs [`SongStore`] with
//! a concrete backend such as the SQLite store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub share_id: String,
    pub title: String,
    pub artist: String,
    pub source_url: String,
    pub chord_content: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when saving a song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: Option<String>,
    pub source_url: Option<String>,
    pub chord_content: String,
    pub notes: Option<String>,
}

impl NewSong {
    /// Title and chord content are mandatory.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() || self.chord_content.trim().is_empty() {
            return Err(StoreError::Invalid(
                "title and chord content are required".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub chord_content: Option<String>,
    pub notes: Option<String>,
    pub source_url: Option<String>,
}

impl SongUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.chord_content.is_none()
            && self.notes.is_none()
            && self.source_url.is_none()
    }
}

/// Identifiers handed back after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSong {
    pub id: i64,
    pub share_id: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid song: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait SongStore: Send + Sync {
    async fn save(&self, song: NewSong) -> Result<SavedSong, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Song>, StoreError>;

    async fn get_by_share_id(&self, share_id: &str) -> Result<Option<Song>, StoreError>;

    /// Most recently updated first.
    async fn list_all(&self) -> Result<Vec<Song>, StoreError>;

    /// Substring match on title or artist, most recently updated first.
    async fn search(&self, text: &str) -> Result<Vec<Song>, StoreError>;

    /// Apply `fields` and return the updated song, or `None` if `id` is unknown.
    async fn update(&self, id: i64, fields: SongUpdate) -> Result<Option<Song>, StoreError>;

    /// Whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_or_content_is_invalid() {
        let song = NewSong {
            title: "Wonderwall".into(),
            chord_content: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(song.validate(), Err(StoreError::Invalid(_))));

        let song = NewSong {
            title: "Wonderwall".into(),
            chord_content: "Em7 G D A".into(),
            ..Default::default()
        };
        assert!(song.validate().is_ok());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(SongUpdate::default().is_empty());
        let update = SongUpdate {
            notes: Some("capo 2".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let moved = SongUpdate {
            source_url: Some("https://amdm.ru/akkordi/kino/99/gruppa_krovi/".into()),
            ..Default::default()
        };
        assert!(!moved.is_empty());
    }
}
