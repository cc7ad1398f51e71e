use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Options accepted by [`HmrClient::connect`](crate::client::HmrClient::connect).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// URL path segment under which chunk assets are served, without a
    /// trailing slash (e.g. `/_next`). Empty means assets live at the root.
    #[serde(default)]
    pub asset_prefix: String,
}

impl ClientOptions {
    pub fn new(asset_prefix: impl Into<String>) -> Self {
        Self {
            asset_prefix: asset_prefix.into(),
        }
    }

    /// Validate option values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the asset prefix is not an
    /// absolute path or ends with a slash.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.asset_prefix;

        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Asset prefix must start with '/': {prefix}"),
            });
        }

        if prefix.ends_with('/') {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Asset prefix must not end with '/': {prefix}"),
            });
        }

        Ok(())
    }
}
