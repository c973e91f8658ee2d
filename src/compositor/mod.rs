//! Compositor: screen regions and the event loop that drives them.

mod app;
mod context;
mod ticker;
pub mod widgets;

pub use app::Compositor;
pub use context::{Context, ReadOutcome, SEARCH_PROMPT};
pub use ticker::Ticker;
