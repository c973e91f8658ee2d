//! Input events.
//!
//! Terminal events are converted into these crate types at the edge so
//! that the editor and the compositor can be driven from tests without
//! a terminal.

mod input;

pub use input::{convert_event, poll_input};

/// Key codes the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character (or a control chord with [`KeyModifiers::control`]).
    Char(char),
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Enter/Return.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab.
    Tab,
    /// Escape.
    Esc,
    /// Function key.
    F(u8),
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift.
    pub shift: bool,
    /// Control.
    pub control: bool,
    /// Alt/Option.
    pub alt: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
    };

    /// Control only.
    pub const CONTROL: Self = Self {
        shift: false,
        control: true,
        alt: false,
    };
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Key.
    pub code: KeyCode,
    /// Modifiers.
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// Key press without modifiers.
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Control chord, e.g. `ctrl('f')`.
    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// True for Ctrl+`c` (case-insensitive).
    pub fn is_ctrl(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(k) if self.modifiers.control && k.eq_ignore_ascii_case(&c))
    }
}

/// Events delivered to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal changed size.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// Bracketed paste.
    Paste(String),
}

impl From<KeyEvent> for InputEvent {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}
