use chordscout_common::StealthLevel;
use chordscout_config::{ScoutConfigLoader, SourceKind, Transport};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
version: "0.1"
browser:
  webdriver_url: "${CHORDSCOUT_TEST_WEBDRIVER}"
  headless: true
  stealth: maximum
extraction:
  timeout_secs: 40
sources:
  - id: ultimate-guitar
    search_transport: browser
  - id: amdm
    enabled: false
    search_transport: http
"#;

#[test]
#[serial]
fn test_config_load_from_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "chordscout.yaml", FILE_YAML);

    temp_env::with_var(
        "CHORDSCOUT_TEST_WEBDRIVER",
        Some("http://127.0.0.1:4444"),
        || {
            let config = ScoutConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.version.as_deref(), Some("0.1"));
            assert_eq!(config.browser.webdriver_url, "http://127.0.0.1:4444");
            assert_eq!(config.browser.stealth, StealthLevel::Maximum);
            assert_eq!(config.extraction.timeout_secs, 40);
            // untouched sections keep their defaults
            assert_eq!(config.extraction.min_content_chars, 50);
            assert_eq!(config.http.timeout_secs, 10);

            let ug = config.source(SourceKind::UltimateGuitar).unwrap();
            assert!(ug.enabled);
            assert_eq!(ug.search_transport, Some(Transport::Browser));
            assert_eq!(ug.extract_transport, None);
            assert!(!config.source(SourceKind::Amdm).unwrap().enabled);
        },
    );
}

#[test]
#[serial]
fn env_overrides_win_over_files() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "chordscout.yaml", "browser:\n  headless: true\n");

    temp_env::with_vars(
        [
            ("CHORDSCOUT__BROWSER__HEADLESS", Some("false")),
            ("CHORDSCOUT__EXTRACTION__TIMEOUT_SECS", Some("35")),
        ],
        || {
            let config = ScoutConfigLoader::new().with_file(&p).load().unwrap();
            assert!(!config.browser.headless);
            assert_eq!(config.extraction.timeout_secs, 35);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let config = ScoutConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("optional file may be absent");
    assert_eq!(config.sources.len(), 2);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = ScoutConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}
