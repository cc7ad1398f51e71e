// Unit tests for WatchConfig loading and validation

use crate::config::{
    DEFAULT_ASSET_PREFIX, DEFAULT_PAGE_URL, DEFAULT_SERVER_URL, ReconnectPolicy, WatchConfig,
};

use hmr_core::error::ConfigError;

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("hmr-watch.json"), contents).unwrap();
}

/// **VALUE**: A missing config file means "run against the default dev server".
///
/// **BUG THIS CATCHES**: Would catch treating a missing file as an error, which
/// would make first runs fail.
#[test]
fn given_no_config_file_when_loading_then_returns_defaults() {
    // GIVEN: An empty config directory
    let dir = TempDir::new().unwrap();

    // WHEN: Loading
    let config = WatchConfig::load(dir.path()).unwrap();

    // THEN: Defaults are used
    assert_eq!(config, WatchConfig::default());
    assert_eq!(config.server.url, DEFAULT_SERVER_URL);
    assert_eq!(config.server.url, "ws://localhost:3000/turbopack-hmr");
    assert_eq!(config.page.url, DEFAULT_PAGE_URL);
    assert_eq!(config.client.asset_prefix, DEFAULT_ASSET_PREFIX);
}

/// **VALUE**: Partial files only override what they name.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` on a
/// section, which would make every key mandatory.
#[test]
fn given_partial_config_when_loading_then_fills_in_defaults() {
    // GIVEN: A file that sets only the server URL and the asset prefix
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"{
            "server": { "url": "wss://dev.example.com/hmr", "reconnectGiveUpAfterSecs": 30 },
            "client": { "assetPrefix": "/static" }
        }"#,
    );

    // WHEN: Loading
    let config = WatchConfig::load(dir.path()).unwrap();

    // THEN: Named values win, the rest are defaults
    assert_eq!(config.server.url, "wss://dev.example.com/hmr");
    assert_eq!(config.client.asset_prefix, "/static");
    assert_eq!(config.page.url, DEFAULT_PAGE_URL);
    assert_eq!(
        config.server.reconnect_policy(),
        ReconnectPolicy {
            max_interval: Duration::from_millis(5_000),
            give_up_after: Some(Duration::from_secs(30)),
        }
    );
}

#[test]
fn given_malformed_json_when_loading_then_returns_parse_error() {
    // GIVEN: A file that is not JSON
    let dir = TempDir::new().unwrap();
    write_config(&dir, "{ server: nope");

    // WHEN: Loading
    let result = WatchConfig::load(dir.path());

    // THEN: ParseError naming the file
    match result {
        Err(ConfigError::ParseError { path, .. }) => {
            assert!(path.ends_with("hmr-watch.json"));
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

/// **VALUE**: Only WebSocket URLs can reach the update server.
///
/// **BUG THIS CATCHES**: Would catch an http:// URL slipping through and
/// failing later inside the socket task with a less useful message.
#[test]
fn given_http_server_url_when_loading_then_returns_validation_error() {
    // GIVEN: An http:// server URL
    let dir = TempDir::new().unwrap();
    write_config(&dir, r#"{ "server": { "url": "http://localhost:3000/hmr" } }"#);

    // WHEN: Loading
    let result = WatchConfig::load(dir.path());

    // THEN: Validation fails on the URL
    match result {
        Err(ConfigError::ValidationError { reason, .. }) => {
            assert!(reason.contains("http://localhost:3000/hmr"), "got: {reason}");
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

#[test]
fn given_asset_prefix_with_trailing_slash_when_validating_then_fails() {
    // GIVEN: Client options the core would reject
    let mut config = WatchConfig::default();
    config.client.asset_prefix = String::from("/_next/");

    // WHEN / THEN: The app-level validation reports it too
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn given_unsupported_version_when_validating_then_fails() {
    let config = WatchConfig {
        version: 2,
        ..WatchConfig::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn given_zero_reconnect_interval_when_validating_then_fails() {
    let mut config = WatchConfig::default();
    config.server.reconnect_max_interval_ms = 0;

    assert!(config.validate().is_err());
}

/// **VALUE**: The HTML snapshot path is relative to the config directory,
/// not to wherever the binary was started.
///
/// **BUG THIS CATCHES**: Would catch returning `html_path` unresolved.
#[test]
fn given_relative_html_path_when_building_page_source_then_resolves_against_config_dir() {
    // GIVEN: Default page config in some directory
    let config = WatchConfig::default();
    let config_dir = Path::new("/srv/app/config");

    // WHEN: Building the page source
    let source = config.page_source(config_dir).unwrap();

    // THEN: Path and URL are both resolved
    assert_eq!(source.html_path, config_dir.join("index.html"));
    assert_eq!(source.location.as_str(), DEFAULT_PAGE_URL);
}
