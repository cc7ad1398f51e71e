//! Logging for the headless hot reload driver.
//!
//! Colored lines on stdout for whoever is watching the session, and a plain
//! `hmr-watch.log` in the log directory for after the fact. Initialized once
//! per process; the level can be overridden without rebuilding.

use crate::error::WatchError;

use common::ErrorLocation;

use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Thread-safe initialization guard.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

/// Log file name, created inside the log directory.
const LOG_FILE_NAME: &str = "hmr-watch.log";

/// Environment variable overriding the build's default level (`trace` .. `off`).
pub const LOG_LEVEL_ENV: &str = "HMR_WATCH_LOG_LEVEL";

/// The socket crates log every frame; above Warn they drown out updates.
const SOCKET_CRATES: [&str; 2] = ["tungstenite", "tokio_tungstenite"];

#[cfg(debug_assertions)]
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Pick the log level from an optional override.
///
/// Unset or blank means the build default. An unparsable value is an error
/// rather than a silent fallback, so a typo does not hide debug output.
pub fn resolve_level(level_override: Option<&str>) -> Result<LevelFilter, WatchError> {
    match level_override.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LOG_LEVEL),
        Some(value) => value.parse::<LevelFilter>().map_err(|_| WatchError::Watch {
            message: format!("Invalid {LOG_LEVEL_ENV} value `{value}` (expected trace, debug, info, warn, error or off)"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Initialize stdout and file logging at `level`.
///
/// Later calls log a warning and return Ok without touching the installed
/// logger.
///
/// # Errors
///
/// Returns [`WatchError::Watch`] if the log file cannot be created or a
/// global logger is already installed by someone else.
pub fn initialize(log_dir: &Path, level: LevelFilter) -> Result<(), WatchError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, level);
        if result.is_ok() {
            info!("Logging at {level:?} to {}", log_dir.join(LOG_FILE_NAME).display());
        }
    });

    result
}

#[track_caller]
pub(crate) fn initialize_internal(log_dir: &Path, level: LevelFilter) -> Result<(), WatchError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = fern::log_file(&log_file_path).map_err(|e| WatchError::Watch {
        message: format!("Failed to create log file {}: {e}", log_file_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let socket_level = level.min(LevelFilter::Warn);
    let base_dispatch = SOCKET_CRATES
        .iter()
        .fold(Dispatch::new().level(level), |dispatch, target| {
            dispatch.level_for(*target, socket_level)
        });

    // Stdout: which module said it matters more than where
    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} ({target})",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                target = record.target(),
            ))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(log_file);

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| WatchError::Watch {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
