//! Diffing: turn the change between two frames into ANSI bytes.
//!
//! Only cells that differ are written. The cursor position and the
//! active attributes are tracked so that adjacent cells need no cursor
//! move and runs with the same attributes need no SGR sequence. The
//! caller flushes the accumulated bytes with a single write.

use super::cell::{Attrs, Cell};
use super::frame::Frame;
use std::io::Write;

/// What the terminal is known to be showing.
#[derive(Debug, Clone)]
pub struct DiffState {
    cursor: Option<(u16, u16)>,
    attrs: Option<Attrs>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    /// State with nothing known.
    pub const fn new() -> Self {
        Self {
            cursor: None,
            attrs: None,
        }
    }

    /// Forget the cursor and attributes, forcing explicit sequences.
    pub const fn reset(&mut self) {
        self.cursor = None;
        self.attrs = None;
    }

    /// Record an explicit cursor move made outside the diff.
    pub const fn moved_to(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }
}

/// Counters from one diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Cells written.
    pub cells_changed: usize,
    /// Cursor moves emitted.
    pub cursor_moves: usize,
    /// SGR sequences emitted.
    pub attr_changes: usize,
}

/// Emit the bytes that turn `current` into `next`.
///
/// Frames must have the same size; callers resize both and use
/// [`render_full`] after a resize.
pub fn render_diff(
    current: &Frame,
    next: &Frame,
    output: &mut Vec<u8>,
    state: &mut DiffState,
) -> DiffResult {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut result = DiffResult::default();
    let width = usize::from(next.width());
    if width == 0 {
        return result;
    }

    for (idx, (old, new)) in current.cells().iter().zip(next.cells()).enumerate() {
        if old == new || new.is_continuation() {
            continue;
        }
        let x = u16::try_from(idx % width).unwrap_or(u16::MAX);
        let y = u16::try_from(idx / width).unwrap_or(u16::MAX);
        write_cell(output, state, &mut result, x, y, new);
    }

    if result.cells_changed > 0 && state.attrs != Some(Attrs::empty()) {
        output.extend_from_slice(b"\x1b[0m");
        state.attrs = Some(Attrs::empty());
    }
    result
}

/// Emit bytes that repaint `frame` from scratch.
pub fn render_full(frame: &Frame, output: &mut Vec<u8>, state: &mut DiffState) -> DiffResult {
    state.reset();
    output.extend_from_slice(b"\x1b[0m\x1b[2J");
    state.attrs = Some(Attrs::empty());

    let mut result = DiffResult::default();
    let width = usize::from(frame.width());
    if width == 0 {
        return result;
    }

    for (idx, cell) in frame.cells().iter().enumerate() {
        if cell.is_continuation() || *cell == Cell::BLANK {
            continue;
        }
        let x = u16::try_from(idx % width).unwrap_or(u16::MAX);
        let y = u16::try_from(idx / width).unwrap_or(u16::MAX);
        write_cell(output, state, &mut result, x, y, cell);
    }

    if state.attrs != Some(Attrs::empty()) {
        output.extend_from_slice(b"\x1b[0m");
        state.attrs = Some(Attrs::empty());
    }
    result
}

fn write_cell(
    output: &mut Vec<u8>,
    state: &mut DiffState,
    result: &mut DiffResult,
    x: u16,
    y: u16,
    cell: &Cell,
) {
    result.cells_changed += 1;

    if state.cursor != Some((x, y)) {
        emit_cursor_move(output, x, y);
        result.cursor_moves += 1;
    }

    if state.attrs != Some(cell.attrs()) {
        emit_attrs(output, cell.attrs());
        state.attrs = Some(cell.attrs());
        result.attr_changes += 1;
    }

    let mut utf8 = [0u8; 4];
    output.extend_from_slice(cell.symbol().encode_utf8(&mut utf8).as_bytes());

    let advance = u16::from(cell.width().max(1));
    state.cursor = Some((x.saturating_add(advance), y));
}

/// Absolute cursor move, 1-indexed on the wire.
pub(crate) fn emit_cursor_move(output: &mut Vec<u8>, x: u16, y: u16) {
    let row = u32::from(y) + 1;
    let col = u32::from(x) + 1;
    if col == 1 {
        let _ = write!(output, "\x1b[{row}H");
    } else {
        let _ = write!(output, "\x1b[{row};{col}H");
    }
}

/// A single SGR sequence that resets and then applies `attrs`.
fn emit_attrs(output: &mut Vec<u8>, attrs: Attrs) {
    output.extend_from_slice(b"\x1b[0");
    if attrs.contains(Attrs::BOLD) {
        output.extend_from_slice(b";1");
    }
    if attrs.contains(Attrs::DIM) {
        output.extend_from_slice(b";2");
    }
    if attrs.contains(Attrs::UNDERLINE) {
        output.extend_from_slice(b";4");
    }
    if attrs.contains(Attrs::REVERSED) {
        output.extend_from_slice(b";7");
    }
    output.push(b'm');
}
