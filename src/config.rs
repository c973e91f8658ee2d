//! Configuration: defaults, the optional YAML file, and derived paths.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user data directory under `$HOME`.
pub const DATA_DIR_NAME: &str = ".optionsnumerics";

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the session log, history, subscriptions and secrets.
    pub data_dir: PathBuf,
    /// Prompt shown before the command line.
    pub prompt: String,
    /// Scrollback capacity in lines.
    pub output_capacity: usize,
    /// Column at which output lines are wrapped.
    pub line_width: usize,
    /// Number of distinct commands kept in history.
    pub history_capacity: usize,
    /// Maximum characters in one command line.
    pub max_line_length: usize,
    /// Input and scrolling behaviour.
    pub input: InputConfig,
    /// Streaming behaviour.
    pub stream: StreamConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: home.join(DATA_DIR_NAME),
            prompt: String::from(":) "),
            output_capacity: 10_000,
            line_width: 256,
            history_capacity: 2_000,
            max_line_length: 999,
            input: InputConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

/// Keyboard polling and viewport scrolling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// How long one key read may block, in milliseconds.
    pub key_poll_ms: u64,
    /// Rows moved by the first page-up/page-down.
    pub scroll_rate: f64,
    /// Extra rows added for each consecutive step in the same direction.
    pub scroll_step: f64,
    /// A gap longer than this (milliseconds) resets the acceleration.
    pub scroll_pause_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_poll_ms: 25,
            scroll_rate: 5.0,
            scroll_step: 2.0,
            scroll_pause_ms: 250,
        }
    }
}

impl InputConfig {
    /// Key poll timeout.
    pub const fn key_poll(&self) -> Duration {
        Duration::from_millis(self.key_poll_ms)
    }

    /// Scroll acceleration reset interval.
    pub const fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }
}

/// Market-data stream settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Real-time endpoint base (market is appended).
    pub primary_url: String,
    /// Delayed endpoint base, tried when the primary fails.
    pub secondary_url: String,
    /// Market cluster (`stocks`, `options`, ...).
    pub market: String,
    /// Period of the stream tick in milliseconds.
    pub tick_interval_ms: u64,
    /// Socket readiness wait per tick in milliseconds.
    pub socket_wait_ms: u64,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Values older than this many seconds are drawn dimmed.
    pub stale_after_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            primary_url: String::from("wss://socket.polygon.io"),
            secondary_url: String::from("wss://delayed.polygon.io"),
            market: String::from("stocks"),
            tick_interval_ms: 100,
            socket_wait_ms: 5,
            connect_timeout_ms: 5_000,
            stale_after_secs: 120,
        }
    }
}

impl StreamConfig {
    /// Full real-time endpoint URL.
    pub fn primary_endpoint(&self) -> String {
        format!("{}/{}", self.primary_url.trim_end_matches('/'), self.market)
    }

    /// Full delayed endpoint URL.
    pub fn secondary_endpoint(&self) -> String {
        format!("{}/{}", self.secondary_url.trim_end_matches('/'), self.market)
    }

    /// Tick period.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Readiness wait.
    pub const fn socket_wait(&self) -> Duration {
        Duration::from_millis(self.socket_wait_ms)
    }

    /// Connect timeout.
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Staleness threshold.
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Config {
    /// Load `path` if it exists, otherwise return defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io("reading configuration", path, e))?;
        Self::from_yaml(&text).map_err(|message| Error::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str) -> std::result::Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }

    /// Override the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Default configuration file location.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(home.join(DATA_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Which configuration file to read: an explicit path wins, then the
    /// file inside an overridden data directory, then [`Config::default_path`].
    pub fn resolve_path(explicit: Option<&Path>, data_dir: Option<&Path>) -> Result<PathBuf> {
        match (explicit, data_dir) {
            (Some(path), _) => Ok(path.to_path_buf()),
            (None, Some(dir)) => Ok(dir.join(CONFIG_FILE_NAME)),
            (None, None) => Self::default_path(),
        }
    }

    /// Persisted scrollback.
    pub fn session_log_path(&self) -> PathBuf {
        self.data_dir.join("on_sessions_log.txt")
    }

    /// Persisted command history.
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("on_things_remembered.txt")
    }

    /// Persisted subscription list.
    pub fn subscriptions_path(&self) -> PathBuf {
        self.data_dir.join("on_streams.txt")
    }

    /// Directory for API tokens.
    pub fn secrets_dir(&self) -> PathBuf {
        self.data_dir.join("secrets")
    }

    /// Default log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Create the data directory if missing.
    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| Error::DirectoryCreation {
            path: self.data_dir.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prompt, ":) ");
        assert_eq!(config.output_capacity, 10_000);
        assert_eq!(config.history_capacity, 2_000);
        assert_eq!(config.stream.tick_interval(), Duration::from_millis(100));
        assert_eq!(
            config.stream.primary_endpoint(),
            "wss://socket.polygon.io/stocks"
        );
        assert_eq!(
            config.stream.secondary_endpoint(),
            "wss://delayed.polygon.io/stocks"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("prompt: \"> \"\nstream:\n  market: options\n").unwrap();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.stream.market, "options");
        assert_eq!(config.stream.tick_interval_ms, 100);
        assert_eq!(config.line_width, 256);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("prompt: [unclosed").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.max_line_length, 999);
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "output_capacity: lots").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_config_path_follows_data_dir() {
        let path = Config::resolve_path(None, Some(Path::new("/tmp/on"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/on/config.yaml"));

        let explicit = Config::resolve_path(
            Some(Path::new("/etc/on.yaml")),
            Some(Path::new("/tmp/on")),
        )
        .unwrap();
        assert_eq!(explicit, PathBuf::from("/etc/on.yaml"));
    }

    #[test]
    fn test_config_in_data_dir_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "prompt: \"$ \"\n").unwrap();
        let path = Config::resolve_path(None, Some(dir.path())).unwrap();
        let config = Config::load(&path).unwrap().with_data_dir(dir.path());
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.history_path(), dir.path().join("on_things_remembered.txt"));
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = Config::default().with_data_dir("/tmp/on");
        assert_eq!(config.history_path(), PathBuf::from("/tmp/on/on_things_remembered.txt"));
        assert_eq!(config.subscriptions_path(), PathBuf::from("/tmp/on/on_streams.txt"));
        assert_eq!(config.secrets_dir(), PathBuf::from("/tmp/on/secrets"));
    }
}
