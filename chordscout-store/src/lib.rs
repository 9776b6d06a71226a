//! SQLite-backed [`SongStore`].

use std::str::FromStr;

use async_trait::async_trait;
use chordscout_core::songs::{
    NewSong, SavedSong, Song, SongStore, SongUpdate, StoreError, UNKNOWN_ARTIST,
};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

const SHARE_ID_LEN: usize = 8;
const SHARE_ID_ATTEMPTS: usize = 3;

// Millisecond timestamps keep "most recently updated" stable within a second.
const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  share_id TEXT UNIQUE NOT NULL,
  title TEXT NOT NULL,
  artist TEXT NOT NULL DEFAULT 'Unknown Artist',
  source_url TEXT,
  chord_content TEXT,
  notes TEXT DEFAULT '',
  created_at DATETIME DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
  updated_at DATETIME DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_songs_share_id ON songs(share_id);
CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title);
"#;

const SELECT_SONG: &str = "SELECT id, share_id, title, artist, source_url, chord_content, notes, \
     created_at, updated_at FROM songs";

#[derive(sqlx::FromRow)]
struct SongRow {
    id: i64,
    share_id: String,
    title: String,
    artist: String,
    source_url: Option<String>,
    chord_content: Option<String>,
    notes: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<SongRow> for Song {
    fn from(r: SongRow) -> Self {
        Song {
            id: r.id,
            share_id: r.share_id,
            title: r.title,
            artist: r.artist,
            source_url: r.source_url.unwrap_or_default(),
            chord_content: r.chord_content.unwrap_or_default(),
            notes: r.notes.unwrap_or_default(),
            created_at: r.created_at.and_utc(),
            updated_at: r.updated_at.and_utc(),
        }
    }
}

fn db_err(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

fn new_share_id() -> String {
    Uuid::new_v4().simple().to_string()[..SHARE_ID_LEN].to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_err)?;
        info!(target: "chords.store", url = %url, "store.connect");
        Self::from_pool(pool).await
    }

    /// Private in-memory database; a single connection keeps it alive.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_err)?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    async fn insert(&self, song: &NewSong, share_id: &str) -> Result<i64, sqlx::Error> {
        let artist = non_blank(song.artist.clone()).unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let res = sqlx::query(
            r#"INSERT INTO songs (share_id, title, artist, source_url, chord_content, notes)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(share_id)
        .bind(song.title.trim())
        .bind(artist)
        .bind(song.source_url.as_deref().unwrap_or_default())
        .bind(song.chord_content.as_str())
        .bind(song.notes.as_deref().unwrap_or_default())
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn save(&self, song: NewSong) -> Result<SavedSong, StoreError> {
        song.validate()?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let share_id = new_share_id();
            match self.insert(&song, &share_id).await {
                Ok(id) => {
                    info!(target: "chords.store", id, share_id = %share_id, "store.save");
                    return Ok(SavedSong { id, share_id });
                }
                Err(sqlx::Error::Database(e))
                    if e.is_unique_violation() && attempt < SHARE_ID_ATTEMPTS =>
                {
                    warn!(target: "chords.store", share_id = %share_id, "store.save.share_id_collision");
                }
                Err(e) => return Err(db_err(e)),
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Song>, StoreError> {
        let row = sqlx::query_as::<_, SongRow>(&format!("{SELECT_SONG} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Song::from))
    }

    async fn get_by_share_id(&self, share_id: &str) -> Result<Option<Song>, StoreError> {
        let row = sqlx::query_as::<_, SongRow>(&format!("{SELECT_SONG} WHERE share_id = ?1"))
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Song::from))
    }

    async fn list_all(&self) -> Result<Vec<Song>, StoreError> {
        let rows = sqlx::query_as::<_, SongRow>(&format!(
            "{SELECT_SONG} ORDER BY updated_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Song::from).collect())
    }

    async fn search(&self, text: &str) -> Result<Vec<Song>, StoreError> {
        let pat = format!("%{}%", text.trim());
        let rows = sqlx::query_as::<_, SongRow>(&format!(
            "{SELECT_SONG} WHERE title LIKE ?1 OR artist LIKE ?1 ORDER BY updated_at DESC, id DESC"
        ))
        .bind(pat)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        info!(target: "chords.store", query = %text, rows = rows.len(), "store.search");
        Ok(rows.into_iter().map(Song::from).collect())
    }

    async fn update(&self, id: i64, fields: SongUpdate) -> Result<Option<Song>, StoreError> {
        if fields.is_empty() {
            return self.get_by_id(id).await;
        }

        let res = sqlx::query(&format!(
            r#"UPDATE songs SET
                 title = COALESCE(?1, title),
                 artist = COALESCE(?2, artist),
                 chord_content = COALESCE(?3, chord_content),
                 notes = COALESCE(?4, notes),
                 source_url = COALESCE(?5, source_url),
                 updated_at = {NOW}
               WHERE id = ?6"#
        ))
        .bind(fields.title)
        .bind(fields.artist)
        .bind(fields.chord_content)
        .bind(fields.notes)
        .bind(fields.source_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        info!(target: "chords.store", id, rows = res.rows_affected(), "store.update");

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM songs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        info!(target: "chords.store", id, rows = res.rows_affected(), "store.delete");
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_ids_are_short_hex() {
        let id = new_share_id();
        assert_eq!(id.len(), SHARE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_share_id(), new_share_id());
    }

    #[test]
    fn blank_artist_is_treated_as_missing() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Oasis ".into())).as_deref(), Some("Oasis"));
        assert_eq!(non_blank(None), None);
    }
}
