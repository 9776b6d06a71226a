use std::path::PathBuf;

use anyhow::{Context, Result};
use chordscout_common::observability::init_logging;
use chordscout_config::{ScoutConfig, ScoutConfigLoader};
use clap::{Parser, Subcommand};

mod commands;

/// Find chord sheets online and keep the ones worth playing.
#[derive(Parser, Debug)]
#[command(name = "chordscout")]
#[command(version)]
struct Cli {
    /// Extra config file merged over the per-user one
    #[arg(short, long, env = "CHORDSCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every matching source for a song
    Search {
        query: String,
        /// Also extract chord text for the first N results
        #[arg(long, value_name = "N", default_value_t = 0)]
        with_text: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print the chord text of one song page
    Extract { url: String },
    /// Extract a song page and store it
    Save {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Work with saved songs
    #[command(subcommand)]
    Songs(SongsCommand),
}

#[derive(Subcommand, Debug)]
enum SongsCommand {
    List,
    Show { id: i64 },
    Share { share_id: String },
    Find { text: String },
    Delete { id: i64 },
}

fn load_config(path: Option<&PathBuf>) -> Result<ScoutConfig> {
    let mut loader = ScoutConfigLoader::new().with_default_file();
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    loader.load().context("loading configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(config.logging.to_log_config("chordscout"))?;

    match cli.command {
        Command::Search {
            query,
            with_text,
            json,
        } => commands::search(&config, &query, with_text, json).await,
        Command::Extract { url } => commands::extract(&config, &url).await,
        Command::Save {
            url,
            title,
            artist,
            notes,
        } => commands::save(&config, &url, title, artist, notes).await,
        Command::Songs(cmd) => commands::songs(&config, cmd).await,
    }
}
