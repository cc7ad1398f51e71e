use crate::page::PageSource;

use common::ErrorLocation;
use hmr_core::ClientOptions;
use hmr_core::error::ConfigError;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use const_format::concatcp;
use log::info;
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "hmr-watch.json";
const CONFIG_VERSION: u32 = 1;

pub const DEV_SERVER_HOST: &str = "localhost";
pub const DEV_SERVER_PORT: &str = "3000";
pub const HMR_ENDPOINT: &str = "/turbopack-hmr";
pub const DEFAULT_SERVER_URL: &str =
    concatcp!("ws://", DEV_SERVER_HOST, ":", DEV_SERVER_PORT, HMR_ENDPOINT);
pub const DEFAULT_PAGE_URL: &str = concatcp!("http://", DEV_SERVER_HOST, ":", DEV_SERVER_PORT, "/");
pub const DEFAULT_ASSET_PREFIX: &str = "/_next";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// WebSocket endpoint of the update server.
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_reconnect_max_interval_ms")]
    pub reconnect_max_interval_ms: u64,
    /// Give up reconnecting after this long. `None` retries forever.
    #[serde(default)]
    pub reconnect_give_up_after_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            reconnect_max_interval_ms: default_reconnect_max_interval_ms(),
            reconnect_give_up_after_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// URL the page is served from. Its origin decides which stylesheets are chunks.
    #[serde(default = "default_page_url")]
    pub url: String,
    /// HTML snapshot of the page. Relative paths resolve against the config directory.
    #[serde(default = "default_html_path")]
    pub html_path: PathBuf,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: default_page_url(),
            html_path: default_html_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default = "default_client_options")]
    pub client: ClientOptions,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            page: PageConfig::default(),
            client: default_client_options(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_reconnect_max_interval_ms() -> u64 {
    5_000
}
fn default_page_url() -> String {
    DEFAULT_PAGE_URL.to_string()
}
fn default_html_path() -> PathBuf {
    PathBuf::from("index.html")
}
fn default_client_options() -> ClientOptions {
    ClientOptions::new(DEFAULT_ASSET_PREFIX)
}

// ============================================
// IMPLEMENTATION
// ============================================

/// How the socket retries after a failed or dropped connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_interval: Duration,
    pub give_up_after: Option<Duration>,
}

impl ServerConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_interval: Duration::from_millis(self.reconnect_max_interval_ms),
            give_up_after: self.reconnect_give_up_after_secs.map(Duration::from_secs),
        }
    }
}

impl WatchConfig {
    /// Load config from {config_dir}/hmr-watch.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file does not exist.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            })?;

        let config: WatchConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if !self.server.url.starts_with("ws://") && !self.server.url.starts_with("wss://") {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid update server URL: {}", self.server.url),
            });
        }

        if self.server.reconnect_max_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("reconnectMaxIntervalMs must be greater than zero"),
            });
        }

        self.page_url()?;
        self.client.validate()?;

        Ok(())
    }

    /// Where to find the page, with `html_path` resolved against `config_dir`.
    pub fn page_source(&self, config_dir: &Path) -> Result<PageSource, ConfigError> {
        Ok(PageSource {
            location: self.page_url()?,
            html_path: config_dir.join(&self.page.html_path),
        })
    }

    #[track_caller]
    fn page_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.page.url).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid page URL {}: {e}", self.page.url),
        })
    }
}
