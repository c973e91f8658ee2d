//! Rect: a rectangle primitive for layout calculations.

/// A rectangle defined by position and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Column of the top-left corner.
    pub x: u16,
    /// Row of the top-left corner.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    /// Zero-sized rectangle.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// The whole screen.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// True when the rectangle covers no cells.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// True when the cell at (`x`, `y`) lies inside.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// The single row at offset `row` from the top, or [`Rect::ZERO`].
    #[inline]
    #[must_use]
    pub const fn row(&self, row: u16) -> Self {
        if row >= self.height {
            return Self::ZERO;
        }
        Self::new(self.x, self.y + row, self.width, 1)
    }

    /// Split into top and bottom parts at a row offset.
    pub fn split_vertical(&self, at: u16) -> (Self, Self) {
        let at = at.min(self.height);
        (
            Self::new(self.x, self.y, self.width, at),
            Self::new(self.x, self.y + at, self.width, self.height - at),
        )
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {} {}x{})", self.x, self.y, self.width, self.height)
    }
}
