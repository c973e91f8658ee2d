//! Editor: the line editor and its building blocks.

mod caps;
mod line_editor;
mod scroll;
mod text;

pub use caps::Capabilities;
pub use line_editor::{EditorAction, EditorState, LineEditor};
pub use scroll::{Direction, ScrollAccel};
pub use text::EditBuffer;
