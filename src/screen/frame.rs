//! Frame: a grid of cells for one full screen.

use super::cell::{Attrs, Cell};
use crate::layout::Rect;
use unicode_segmentation::UnicodeSegmentation;

/// A screen-sized grid of cells in row-major order.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl Frame {
    /// Create a blank frame. Zero dimensions are allowed.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![Cell::BLANK; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole frame as a rectangle.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// All cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Cell at (`x`, `y`).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at (`x`, `y`).
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index_of(x, y).map(|i| &mut self.cells[i])
    }

    /// Write `text` starting at (`x`, `y`), clipped to `clip`.
    ///
    /// Returns the number of columns written. A wide glyph that would
    /// straddle the right edge of `clip` is replaced by a blank.
    pub fn set_str(&mut self, x: u16, y: u16, text: &str, attrs: Attrs, clip: Rect) -> u16 {
        if !clip.contains(x, y) {
            return 0;
        }
        let right = clip.right().min(self.width);
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if col >= right {
                break;
            }
            let Some(cell) = Cell::from_grapheme(grapheme) else {
                continue;
            };
            let cell = cell.with_attrs(attrs);
            if cell.width() == 2 {
                if col + 1 >= right {
                    self.put(col, y, Cell::BLANK.with_attrs(attrs));
                    col += 1;
                    break;
                }
                self.put(col, y, cell);
                self.put(col + 1, y, Cell::continuation().with_attrs(attrs));
                col += 2;
            } else {
                self.put(col, y, cell);
                col += 1;
            }
        }
        col - x
    }

    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index_of(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Fill `rect` with blanks carrying `attrs`.
    pub fn fill(&mut self, rect: Rect, attrs: Attrs) {
        let blank = Cell::BLANK.with_attrs(attrs);
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                self.put(x, y, blank);
            }
        }
    }

    /// Add `attrs` to every cell in `rect`, keeping their symbols.
    pub fn add_attrs(&mut self, rect: Rect, attrs: Attrs) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.set_attrs(cell.attrs() | attrs);
                }
            }
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::BLANK);
    }

    /// Text of row `y` with trailing blanks removed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = usize::from(y) * usize::from(self.width);
        let row = &self.cells[start..start + usize::from(self.width)];
        let text: String = row
            .iter()
            .filter(|c| !c.is_continuation())
            .map(Cell::symbol)
            .collect();
        text.trim_end().to_string()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
