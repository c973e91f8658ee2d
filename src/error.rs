//! Error types for optionterm.
//!
//! [`Error`] covers everything that can fail outside the streaming
//! subsystem; stream failures are described by [`StreamError`] and wrapped
//! when they need to cross into the crate-level type.
//!
//! Most of these errors are not fatal. Persistence failures degrade to an
//! empty session, protocol failures drop a single frame, and connectivity
//! failures become a one-line status message.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure with the operation and path that triggered it.
    #[error("I/O error {operation}: {path}")]
    Io {
        /// What was being attempted ("reading history", ...).
        operation: String,
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed.
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid {
        /// Configuration file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Home directory could not be determined.
    #[error("Home directory not found")]
    NoHomeDir,

    /// Terminal setup, teardown, or write failed.
    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    /// Logging could not be initialized.
    #[error("Logging initialization failed: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },

    /// Streaming subsystem failure.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl Error {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Returns true if the event loop can continue after this error.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { .. } | Self::DirectoryCreation { .. } => true,
            Self::Stream(err) => err.is_recoverable(),
            _ => false,
        }
    }

    /// Returns true if the process should exit.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Terminal(_) | Self::Logging { .. })
    }
}

/// Streaming subsystem errors.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Subscribe/unsubscribe attempted before authentication.
    #[error("not authenticated")]
    NotAuthenticated,

    /// No API token is available for authentication.
    #[error("no API token available for the market-data stream")]
    MissingCredential,

    /// Both the primary and the secondary endpoint refused the connection.
    #[error("could not connect to {primary} ({primary_error}) or {secondary} ({secondary_error})")]
    ConnectFailed {
        /// Real-time endpoint URL.
        primary: String,
        /// Why the real-time endpoint failed.
        primary_error: String,
        /// Delayed endpoint URL.
        secondary: String,
        /// Why the delayed endpoint failed.
        secondary_error: String,
    },

    /// The established connection failed.
    #[error("stream transport error: {0}")]
    Transport(String),

    /// A frame could not be understood.
    #[error("malformed stream frame: {0}")]
    Protocol(String),
}

impl StreamError {
    /// Per-frame and ordering errors leave the connection usable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::MissingCredential | Self::Protocol(_))
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<tungstenite::Error> for StreamError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_context() {
        let err = Error::io(
            "reading history",
            "/tmp/history.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("reading history"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_stream_error_classification() {
        assert!(StreamError::NotAuthenticated.is_recoverable());
        assert!(StreamError::Protocol("bad".into()).is_recoverable());
        assert!(!StreamError::Transport("reset".into()).is_recoverable());

        let wrapped: Error = StreamError::Transport("reset".into()).into();
        assert!(!wrapped.is_recoverable());
    }

    #[test]
    fn test_json_error_becomes_protocol() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(StreamError::from(err), StreamError::Protocol(_)));
    }

    #[test]
    fn test_terminal_error_is_fatal() {
        let err = Error::Terminal(std::io::Error::other("no tty"));
        assert!(err.is_fatal());
    }
}
