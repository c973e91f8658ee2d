//! # optionterm
//!
//! The interactive terminal engine of an options-analytics shell.
//!
//! The screen has three fixed regions: a status row on top, a live stream
//! panel with one row per subscribed symbol, and the scrollback with the
//! input line at the bottom. One cooperative event loop interleaves
//! keystrokes with a periodic tick of the market-data WebSocket, so data
//! keeps flowing while the user types.
//!
//! ## Core Concepts
//!
//! - **Bounded scrollback**: [`OutputBuffer`] evicts oldest lines first and
//!   keeps its viewport and search highlights stable across evictions
//! - **History recall**: [`HistoryStore`] de-duplicates commands and counts
//!   their use; the [`LineEditor`] snapshots unsubmitted text during recall
//! - **Streaming**: [`StreamClient`] runs connect, authenticate, subscribe
//!   as an explicit state machine driven by [`StreamClient::tick`]
//! - **Minimal output**: each redraw is diffed against the screen and
//!   written with a single write
//!
//! ## Example
//!
//! ```rust,ignore
//! use optionterm::{Config, Unrecognized};
//!
//! let config = Config::default();
//! optionterm::run(&config, Box::new(Unrecognized))?;
//! ```

pub mod compositor;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod history;
pub mod layout;
pub mod logging;
pub mod output;
pub mod screen;
pub mod shell;
pub mod stream;

pub use compositor::{Compositor, Context, ReadOutcome};
pub use config::Config;
pub use editor::{Capabilities, EditorAction, LineEditor};
pub use error::{Error, Result, StreamError};
pub use event::{InputEvent, KeyCode, KeyEvent, KeyModifiers};
pub use history::HistoryStore;
pub use layout::{Rect, ScreenLayout};
pub use logging::{init_logging, LogGuard};
pub use output::OutputBuffer;
pub use screen::{install_panic_hook, restore_terminal, Attrs, Frame, Painter};
pub use shell::{run, Command, CommandHandler, Reply, Shell, Unrecognized};
pub use stream::{ConnectionState, StreamClient, StreamEvent, TokenStore};
