//! Screen: cells, frames, and minimal-output rendering.
//!
//! Each redraw paints a complete [`Frame`]; the [`Painter`] diffs it
//! against the frame already on screen and writes only the changes,
//! accumulated into one buffer and flushed with one write.

mod cell;
pub mod diff;
mod frame;
mod painter;
mod terminal;

pub use cell::{Attrs, Cell};
pub use frame::Frame;
pub use painter::Painter;
pub use terminal::{install_panic_hook, restore_terminal, Terminal};
