//! Tracing setup for the `chordscout` binary and the test harnesses.
//!
//! Events always go to a daily log file; `emit_stderr` mirrors them to the
//! terminal. Only the first [`init_logging`] call installs a subscriber.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

// Dropping the guard would stop the background writer.
static FILE_WRITER: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "CHORDSCOUT_LOG_DIR";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Names the log file and the fallback data directory.
    pub app_name: &'static str,
    /// Where log files go; `None` means `CHORDSCOUT_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset, e.g. `info,chords.extract=debug`.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "chordscout",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global subscriber and return today's log file.
///
/// Later calls leave the first subscriber in place and return its file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_FILE.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_name = format!("{}.log", config.app_name);
    let stamped = dir.join(format!("{file_name}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_name));
    let _ = FILE_WRITER.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(sinks(config.format, config.emit_stderr, writer))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    let _ = LOG_FILE.set(stamped.clone());
    Ok(stamped)
}

fn sinks(format: LogFormat, emit_stderr: bool, file: NonBlocking) -> Vec<BoxedLayer> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    match format {
        LogFormat::Text => {
            layers.push(fmt::layer().with_writer(file).with_ansi(false).boxed());
            if emit_stderr {
                layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
            }
        }
        LogFormat::Json => {
            layers.push(fmt::layer().json().with_writer(file).boxed());
            if emit_stderr {
                layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
            }
        }
    }
    layers
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }
    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => expand_home(Path::new(&dir)),
        Err(_) => default_data_dir(app_name),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let home = std::env::var("HOME").ok();
    match (path.to_str().and_then(|s| s.strip_prefix("~/")), home) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

fn default_data_dir(app_name: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => [home.as_str(), ".local", "share", app_name].iter().collect(),
        Err(_) => PathBuf::from(".").join(app_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = resolve_log_dir("chordscout", Some(tmp.path()));
        assert_eq!(dir, tmp.path());
    }

    #[test]
    fn absolute_paths_are_not_expanded() {
        assert_eq!(
            expand_home(Path::new("/var/log/chords")),
            PathBuf::from("/var/log/chords")
        );
    }

    #[test]
    fn stderr_mirror_adds_a_sink() {
        let (file, _guard) = tracing_appender::non_blocking(std::io::sink());
        assert_eq!(sinks(LogFormat::Json, false, file.clone()).len(), 1);
        assert_eq!(sinks(LogFormat::Text, true, file).len(), 2);
    }

    #[test]
    fn log_format_reads_lowercase() {
        let f: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(f, LogFormat::Json);
    }
}
