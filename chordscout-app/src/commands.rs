use anyhow::{Context, Result, bail};
use chordscout_config::ScoutConfig;
use chordscout_core::adapters::title_from_url;
use chordscout_core::songs::{NewSong, Song, SongStore};
use chordscout_core::{ChordService, Extracted, NormalizedResult};
use chordscout_store::SqliteSongStore;
use tracing::info;
use url::Url;

use crate::SongsCommand;

fn service(config: &ScoutConfig) -> Result<ChordService> {
    ChordService::from_config(config).context("building chord sources")
}

async fn store(config: &ScoutConfig) -> Result<SqliteSongStore> {
    SqliteSongStore::connect(&config.store.database_url)
        .await
        .with_context(|| format!("opening {}", config.store.database_url))
}

pub async fn search(config: &ScoutConfig, query: &str, with_text: usize, json: bool) -> Result<()> {
    let service = service(config)?;
    let results = if with_text > 0 {
        service.search_and_extract(query, with_text).await?
    } else {
        service.search_chords(query).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            print_result(result);
        }
    }
    Ok(())
}

fn print_result(result: &NormalizedResult) {
    let stub = &result.stub;
    println!(
        "{:>2}. {} - {} [{}] ({})",
        result.rank, stub.artist, stub.title, stub.kind, stub.source
    );
    if !stub.quality_signal.is_empty() {
        println!("    {}", stub.quality_signal);
    }
    println!("    {}", stub.source_url);
    if let Some(text) = &result.text {
        println!();
        println!("{text}");
        println!();
    }
}

pub async fn extract(config: &ScoutConfig, url: &str) -> Result<()> {
    let content = service(config)?.extract_chord_content(url).await?;
    println!("{}", content.text);
    Ok(())
}

pub async fn save(
    config: &ScoutConfig,
    url: &str,
    title: Option<String>,
    artist: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let text = match service(config)?.extract(url).await? {
        Extracted::Chords(text) => text,
        Extracted::Guidance(why) => bail!("{why}"),
    };

    let title = title
        .or_else(|| Url::parse(url.trim()).ok().and_then(|u| title_from_url(&u)))
        .context("no --title given and none could be read from the URL")?;
    let song = NewSong {
        title,
        artist,
        source_url: Some(url.trim().to_string()),
        chord_content: text,
        notes,
    };

    let saved = store(config).await?.save(song).await?;
    info!(id = saved.id, share_id = %saved.share_id, "cli.save");
    println!("saved #{} (share id {})", saved.id, saved.share_id);
    Ok(())
}

pub async fn songs(config: &ScoutConfig, cmd: SongsCommand) -> Result<()> {
    let store = store(config).await?;
    match cmd {
        SongsCommand::List => print_rows(&store.list_all().await?),
        SongsCommand::Find { text } => print_rows(&store.search(&text).await?),
        SongsCommand::Show { id } => match store.get_by_id(id).await? {
            Some(song) => print_song(&song),
            None => bail!("no song with id {id}"),
        },
        SongsCommand::Share { share_id } => match store.get_by_share_id(&share_id).await? {
            Some(song) => print_song(&song),
            None => bail!("no song with share id {share_id}"),
        },
        SongsCommand::Delete { id } => {
            if !store.delete(id).await? {
                bail!("no song with id {id}");
            }
            println!("deleted #{id}");
        }
    }
    Ok(())
}

fn print_rows(songs: &[Song]) {
    if songs.is_empty() {
        println!("no songs");
        return;
    }
    for song in songs {
        println!(
            "{:>4}  {}  {} - {}  ({})",
            song.id,
            song.share_id,
            song.artist,
            song.title,
            song.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_song(song: &Song) {
    println!("{} - {}", song.artist, song.title);
    if !song.source_url.is_empty() {
        println!("{}", song.source_url);
    }
    if !song.notes.is_empty() {
        println!("notes: {}", song.notes);
    }
    println!();
    println!("{}", song.chord_content);
}
