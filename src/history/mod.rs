//! History: remembered commands and their file format.

mod persist;
mod store;

pub use persist::{load_history, parse_line, save_history};
pub use store::{Entry, HistoryStore};
