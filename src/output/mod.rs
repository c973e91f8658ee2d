//! Output: the scrollback buffer, searching it, and persisting it.

mod buffer;
mod search;
mod session;

pub use buffer::{wrap, AppendReport, Hit, OutputBuffer};
pub use search::{Search, SearchOutcome};
pub use session::{load_session_log, restore_into, save_session_log, time_banner, READING_CUE};
