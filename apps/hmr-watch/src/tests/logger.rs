// Unit tests for logger initialization and level selection
// Only the error path of the dispatch builder is exercised directly; a successful run installs the global logger

use crate::error::WatchError;
use crate::logger::{initialize, initialize_internal, resolve_level};

use std::path::PathBuf;

use log::LevelFilter;

/// **VALUE**: Verifies that an unusable log directory surfaces as an error.
///
/// **WHY THIS MATTERS**: The log directory comes from the environment or the
/// platform defaults. A bad value must stop startup with a readable message
/// instead of a panic.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` is unwrapped.
#[test]
fn given_invalid_log_dir_when_initializing_then_returns_watch_error() {
    // GIVEN: A path below a file, which can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch for that directory
    let result = initialize_internal(&invalid_dir, LevelFilter::Info);

    // THEN: A Watch error naming the log file comes back
    match result {
        Err(WatchError::Watch { message, .. }) => {
            assert!(
                message.contains("hmr-watch.log"),
                "Error should name the log file, got: {message}"
            );
        }
        other => panic!("Expected WatchError::Watch, got {other:?}"),
    }
}

/// **VALUE**: Verifies that calling initialize() twice is harmless.
///
/// **WHY THIS MATTERS**: Startup code and tests may both initialize logging.
/// Setting a second global logger would otherwise fail.
///
/// **BUG THIS CATCHES**: Would catch removal of the Once/AtomicBool guards.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable temporary directory
    let temp_dir = tempfile::tempdir().unwrap();

    // WHEN: Initializing twice
    let first = initialize(temp_dir.path(), LevelFilter::Debug);
    let second = initialize(temp_dir.path(), LevelFilter::Trace);

    // THEN: Both calls succeed
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should be a no-op");
}

#[test]
fn given_no_override_when_resolving_level_then_uses_build_default() {
    let unset = resolve_level(None).unwrap();
    let blank = resolve_level(Some("  ")).unwrap();

    assert_eq!(unset, blank);
    assert!(matches!(unset, LevelFilter::Debug | LevelFilter::Info));
}

#[test]
fn given_level_name_when_resolving_level_then_parses_case_insensitively() {
    assert_eq!(resolve_level(Some("trace")).unwrap(), LevelFilter::Trace);
    assert_eq!(resolve_level(Some(" WARN ")).unwrap(), LevelFilter::Warn);
    assert_eq!(resolve_level(Some("off")).unwrap(), LevelFilter::Off);
}

/// **VALUE**: A misspelled level is reported instead of silently ignored.
///
/// **BUG THIS CATCHES**: Would catch falling back to the default on a typo,
/// which leaves the user wondering why `debugg` shows no debug output.
#[test]
fn given_unknown_level_when_resolving_level_then_returns_watch_error() {
    let result = resolve_level(Some("debugg"));

    match result {
        Err(WatchError::Watch { message, .. }) => {
            assert!(message.contains("HMR_WATCH_LOG_LEVEL"), "got: {message}");
            assert!(message.contains("debugg"), "got: {message}");
        }
        other => panic!("Expected WatchError::Watch, got {other:?}"),
    }
}
