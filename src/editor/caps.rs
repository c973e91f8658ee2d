//! Capabilities enabled for one line read.

use bitflags::bitflags;

bitflags! {
    /// What the editor may do while reading a line.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        /// Insert, delete and move the cursor.
        const EDIT = 0b0000_0001;
        /// Up/Down recall from history.
        const HISTORY = 0b0000_0010;
        /// Tab completes from history by prefix.
        const COMPLETION = 0b0000_0100;
        /// Ctrl-F starts a search, Ctrl-R repeats it.
        const SEARCH = 0b0000_1000;
        /// Typed text is not echoed (tokens).
        const HIDDEN = 0b0001_0000;
        /// Page Up/Down scroll the output.
        const SCROLL = 0b0010_0000;
        /// The first key ends the read.
        const ONE_SHOT = 0b0100_0000;
        /// The status line shows the viewport position.
        const STATUS = 0b1000_0000;

        /// The main command prompt.
        const COMMAND = Self::EDIT.bits()
            | Self::HISTORY.bits()
            | Self::COMPLETION.bits()
            | Self::SEARCH.bits()
            | Self::SCROLL.bits()
            | Self::STATUS.bits();
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}
