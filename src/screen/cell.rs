//! Cell: one column of one screen row.

use bitflags::bitflags;
use unicode_width::UnicodeWidthStr;

bitflags! {
    /// Display attributes.
    ///
    /// The terminal is monochrome; emphasis is expressed only through
    /// these SGR attributes.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        /// Bold text (search hits).
        const BOLD = 0b0000_0001;
        /// Faint text (stale stream values).
        const DIM = 0b0000_0010;
        /// Underlined text (search hits).
        const UNDERLINE = 0b0000_0100;
        /// Reverse video (status line).
        const REVERSED = 0b0000_1000;
    }
}

impl std::fmt::Debug for Attrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A single terminal cell.
///
/// A grapheme cluster is represented by its base character; combining
/// marks are dropped. Wide glyphs occupy two cells, the second being a
/// continuation cell that is never emitted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    symbol: char,
    width: u8,
    attrs: Attrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    /// A space with no attributes.
    pub const BLANK: Self = Self {
        symbol: ' ',
        width: 1,
        attrs: Attrs::empty(),
    };

    /// Cell for a single character.
    pub fn from_char(symbol: char) -> Self {
        let width = unicode_width::UnicodeWidthChar::width(symbol).unwrap_or(0);
        Self {
            symbol,
            width: u8::try_from(width.min(2)).unwrap_or(1),
            attrs: Attrs::empty(),
        }
    }

    /// Cell for a grapheme cluster. Returns `None` for zero-width input.
    pub fn from_grapheme(grapheme: &str) -> Option<Self> {
        let symbol = grapheme.chars().next()?;
        let width = UnicodeWidthStr::width(grapheme);
        if width == 0 {
            return None;
        }
        Some(Self {
            symbol,
            width: u8::try_from(width.min(2)).unwrap_or(1),
            attrs: Attrs::empty(),
        })
    }

    /// Placeholder occupying the right half of a wide glyph.
    pub const fn continuation() -> Self {
        Self {
            symbol: '\0',
            width: 0,
            attrs: Attrs::empty(),
        }
    }

    /// Displayed character.
    #[inline]
    pub const fn symbol(&self) -> char {
        self.symbol
    }

    /// Columns occupied (0 for continuation cells).
    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Attributes.
    #[inline]
    pub const fn attrs(&self) -> Attrs {
        self.attrs
    }

    /// True for the right half of a wide glyph.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Replace the attributes.
    #[inline]
    pub const fn set_attrs(&mut self, attrs: Attrs) {
        self.attrs = attrs;
    }

    /// Replace the attributes (builder form).
    #[inline]
    #[must_use]
    pub const fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("symbol", &self.symbol)
            .field("width", &self.width)
            .field("attrs", &self.attrs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_cell() {
        let cell = Cell::from_char('A');
        assert_eq!(cell.symbol(), 'A');
        assert_eq!(cell.width(), 1);
        assert!(cell.attrs().is_empty());
    }

    #[test]
    fn test_wide_cell() {
        let cell = Cell::from_char('日');
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn test_grapheme_keeps_base_character() {
        let cell = Cell::from_grapheme("e\u{301}").unwrap();
        assert_eq!(cell.symbol(), 'e');
        assert_eq!(cell.width(), 1);
        assert!(Cell::from_grapheme("").is_none());
    }

    #[test]
    fn test_attrs_debug() {
        let attrs = Attrs::BOLD | Attrs::UNDERLINE;
        assert_eq!(format!("{attrs:?}"), "BOLD | UNDERLINE");
    }

    #[test]
    fn test_continuation() {
        let cont = Cell::continuation();
        assert!(cont.is_continuation());
        assert_ne!(cont, Cell::BLANK);
    }
}
