//! Structured logging.
//!
//! The terminal is owned by the compositor for the whole session, so nothing
//! may be written to stdout or stderr while it runs. All diagnostics go to a
//! daily-rolling JSON lines file under the data directory instead
//! (`~/.optionsnumerics/logs/optionterm.log` by default).
//!
//! ```no_run
//! let _guard = optionterm::logging::init_logging(None, false).expect("logging init");
//! tracing::info!("session started");
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::DATA_DIR_NAME;
use crate::error::{Error, Result};

/// File name prefix of the rolling log.
pub const LOG_FILE_NAME: &str = "optionterm.log";

/// Flushes pending log lines when dropped. Hold it until exit.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Initialize file logging.
///
/// `log_dir` defaults to [`default_log_dir`]. With `verbose` the crate's
/// filter is lowered to `debug`; `RUST_LOG` overrides both.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| Error::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging {
            message: e.to_string(),
        })?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("optionterm={level}")
}

/// Route tracing output to the test harness. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// `~/.optionsnumerics/logs`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Ok(log_dir_under(&home))
}

/// Log directory for a given home directory.
pub fn log_dir_under(home: &Path) -> PathBuf {
    home.join(DATA_DIR_NAME).join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_under_home() {
        assert_eq!(
            log_dir_under(Path::new("/tmp/test-home")),
            PathBuf::from("/tmp/test-home/.optionsnumerics/logs")
        );
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "optionterm=info");
        assert_eq!(default_directive(true), "optionterm=debug");
    }

    #[test]
    fn test_init_test_logging() {
        init_test_logging();
        init_test_logging();
    }
}
