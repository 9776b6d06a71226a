//! Loader for chordscout configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are attached, and environment
//! variables prefixed with `CHORDSCOUT__` are applied last so they always
//! win (`CHORDSCOUT__BROWSER__HEADLESS=false` overrides `browser.headless`).
//! String values may reference other environment variables as `${VAR}`;
//! those are expanded recursively before the typed structs are built.
//!
//! Every field has a default, so an empty document yields a usable config.
use chordscout_common::observability::{LogConfig, LogFormat};
use chordscout_common::StealthLevel;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CHORDSCOUT";
const CONFIG_FILE_NAME: &str = "chordscout.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub version: Option<String>,
    pub logging: LoggingSettings,
    pub browser: BrowserSettings,
    pub http: HttpSettings,
    pub extraction: ExtractionSettings,
    pub sources: Vec<SourceSpec>,
    pub store: StoreSettings,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            version: None,
            logging: LoggingSettings::default(),
            browser: BrowserSettings::default(),
            http: HttpSettings::default(),
            extraction: ExtractionSettings::default(),
            sources: default_sources(),
            store: StoreSettings::default(),
        }
    }
}

impl ScoutConfig {
    /// Settings for one source, if it is listed.
    pub fn source(&self, kind: SourceKind) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.id == kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            dir: None,
            stderr: false,
        }
    }
}

impl LoggingSettings {
    /// Translate into the observability initializer's config.
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.level.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthLevel,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            stealth: StealthLevel::Balanced,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".into(),
            timeout_secs: 10,
            retries: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Upper bound for a single content extraction.
    pub timeout_secs: u64,
    /// Upper bound for a rendered-browser search.
    pub search_timeout_secs: u64,
    /// Containers with less stripped text than this are ignored.
    pub min_content_chars: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 45,
            search_timeout_secs: 30,
            min_content_chars: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub database_url: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://chords.db?mode=rwc".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    UltimateGuitar,
    Amdm,
}

/// How a page is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http,
    Browser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub id: SourceKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub search_transport: Option<Transport>,
    #[serde(default)]
    pub extract_transport: Option<Transport>,
}

impl SourceSpec {
    pub fn new(id: SourceKind) -> Self {
        Self {
            id,
            enabled: true,
            search_transport: None,
            extract_transport: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new(SourceKind::UltimateGuitar),
        SourceSpec::new(SourceKind::Amdm),
    ]
}

/// Location of the per-user config file, e.g. `~/.config/chordscout/chordscout.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chordscout").join(CONFIG_FILE_NAME))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ScoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ScoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutConfigLoader {
    /// Start with no file sources; `CHORDSCOUT__` env overrides are applied at load time.
    ///
    /// ```
    /// use chordscout_config::ScoutConfigLoader;
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.sources.len(), 2);
    /// assert_eq!(config.extraction.min_content_chars, 50);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach the per-user config file if it exists.
    pub fn with_default_file(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use chordscout_config::{ScoutConfigLoader, SourceKind, Transport};
    ///
    /// let cfg = ScoutConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// sources:
    ///   - id: amdm
    ///     search_transport: http
    ///     extract_transport: browser
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.sources.len(), 1);
    /// let amdm = cfg.source(SourceKind::Amdm).unwrap();
    /// assert_eq!(amdm.extract_transport, Some(Transport::Browser));
    /// assert!(cfg.source(SourceKind::UltimateGuitar).is_none());
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use chordscout_config::ScoutConfigLoader;
    ///
    /// unsafe { std::env::set_var("CHORDS_DB", "sqlite://from-env.db"); }
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// store:
    ///   database_url: "${CHORDS_DB}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.store.database_url, "sqlite://from-env.db");
    ///
    /// unsafe { std::env::remove_var("CHORDS_DB"); }
    /// ```
    pub fn load(self) -> Result<ScoutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("HOST", Some("localhost")), ("PORT", Some("9515"))], || {
            let mut v = json!([
                "http://$HOST",
                { "webdriver_url": "http://${HOST}:${PORT}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!([
                    "http://localhost",
                    { "webdriver_url": "http://localhost:9515" },
                    42,
                    true,
                    null
                ])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_CHORDSCOUT}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_CHORDSCOUT}"));
    }

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: ScoutConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.browser.webdriver_url, "http://localhost:9515");
        assert!(cfg.browser.headless);
        assert_eq!(cfg.http.timeout_secs, 10);
        assert_eq!(cfg.extraction.timeout_secs, 45);
        assert_eq!(cfg.extraction.search_timeout_secs, 30);
        assert_eq!(cfg.sources.len(), 2);
        assert!(cfg.sources.iter().all(|s| s.enabled));
    }

    #[test]
    fn logging_settings_map_to_log_config() {
        let settings = LoggingSettings {
            level: "debug".into(),
            format: LogFormat::Json,
            dir: Some(PathBuf::from("/tmp/chords")),
            stderr: true,
        };
        let log = settings.to_log_config("chordscout-test");
        assert_eq!(log.app_name, "chordscout-test");
        assert_eq!(log.default_filter, "debug");
        assert!(log.emit_stderr);
        assert_eq!(log.format, LogFormat::Json);
    }
}
