use common::ErrorLocation;
use hmr_core::CoreError;
use hmr_core::error::ConfigError;

use thiserror::Error;

/// Errors raised by the headless driver.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Error from this app (startup, logging, filesystem)
    #[error("Watch Error: {message} {location}")]
    Watch {
        message: String,
        location: ErrorLocation,
    },

    /// The page HTML could not be loaded
    #[error("Page Error: {message} {location}")]
    Page {
        message: String,
        location: ErrorLocation,
    },

    /// Error from the hot reload client itself
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
