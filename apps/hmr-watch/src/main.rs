use hmr_watch::config::WatchConfig;
use hmr_watch::error::WatchError;
use hmr_watch::logger::{LOG_LEVEL_ENV, initialize as LoggerInitialize, resolve_level};
use hmr_watch::session::run_session;
use hmr_watch::socket::spawn_socket;

use hmr_core::transport::Transport;

use common::ErrorLocation;

use std::env::{var, var_os};
use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;
use std::rc::Rc;

use log::info;

const APP_DIR_NAME: &str = "hmr-watch";
const CONFIG_DIR_ENV: &str = "HMR_WATCH_CONFIG_DIR";
const LOG_DIR_ENV: &str = "HMR_WATCH_LOG_DIR";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), WatchError> {
    // Optional .env next to the binary or in the working directory
    dotenvy::dotenv().ok();

    let config_dir = directory_from_env(CONFIG_DIR_ENV, dirs::config_dir)?;
    let log_dir = directory_from_env(LOG_DIR_ENV, dirs::data_local_dir)?.join("logs");

    create_dir_all(&log_dir).map_err(|e| WatchError::Watch {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    let level = resolve_level(var(LOG_LEVEL_ENV).ok().as_deref())?;
    LoggerInitialize(&log_dir, level)?;

    info!("hmr-watch starting");
    info!("Config directory: {}", config_dir.display());
    info!("Log directory: {}", log_dir.display());

    let config = WatchConfig::load(&config_dir)?;
    let source = config.page_source(&config_dir)?;

    info!("Watching {} for {}", config.server.url, source.location);

    let socket = spawn_socket(config.server.url.clone(), config.server.reconnect_policy());
    let transport: Rc<dyn Transport> = Rc::new(socket.transport);

    let summary = run_session(&config.client, &source, transport, socket.events).await?;
    info!("Session ended after {} page reloads", summary.reloads);

    socket.task.abort();
    Ok(())
}

/// `$env_var` if set, else `fallback()/hmr-watch`.
fn directory_from_env(
    env_var: &str,
    fallback: fn() -> Option<PathBuf>,
) -> Result<PathBuf, WatchError> {
    if let Some(dir) = var_os(env_var) {
        return Ok(PathBuf::from(dir));
    }

    fallback()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| WatchError::Watch {
            message: format!("No default directory available; set {env_var}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
