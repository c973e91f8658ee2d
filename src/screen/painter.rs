//! Painter: double-buffered presentation of frames.

use super::diff::{emit_cursor_move, render_diff, render_full, DiffResult, DiffState};
use super::frame::Frame;
use std::io::{self, Write};

/// Owns the frame on screen and the frame being drawn.
///
/// Callers draw the whole screen into [`Painter::frame_mut`] and call
/// [`Painter::present`]; only the cells that changed reach the terminal.
#[derive(Debug)]
pub struct Painter {
    current: Frame,
    next: Frame,
    state: DiffState,
    output: Vec<u8>,
    cursor: Option<(u16, u16)>,
    needs_full: bool,
    frames: u64,
}

impl Painter {
    /// Painter for a `width` x `height` screen. The first present is a
    /// full repaint.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            current: Frame::new(width, height),
            next: Frame::new(width, height),
            state: DiffState::new(),
            output: Vec::with_capacity(16 * 1024),
            cursor: None,
            needs_full: true,
            frames: 0,
        }
    }

    /// Frame to draw into. It starts blank for every present.
    pub const fn frame_mut(&mut self) -> &mut Frame {
        &mut self.next
    }

    /// Frame last presented.
    pub const fn current(&self) -> &Frame {
        &self.current
    }

    /// Where to leave the visible cursor; `None` hides it.
    pub const fn set_cursor(&mut self, cursor: Option<(u16, u16)>) {
        self.cursor = cursor;
    }

    /// Frames presented so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Change the screen size. The next present repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.current.resize(width, height);
        self.next.resize(width, height);
        self.needs_full = true;
    }

    /// Force a full repaint on the next present.
    pub const fn invalidate(&mut self) {
        self.needs_full = true;
    }

    /// Write the pending frame to `out` with a single write.
    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<DiffResult> {
        self.output.clear();
        self.output.extend_from_slice(b"\x1b[?25l");

        let result = if self.needs_full {
            self.needs_full = false;
            render_full(&self.next, &mut self.output, &mut self.state)
        } else {
            render_diff(&self.current, &self.next, &mut self.output, &mut self.state)
        };

        if let Some((x, y)) = self.cursor {
            emit_cursor_move(&mut self.output, x, y);
            self.state.moved_to(x, y);
            self.output.extend_from_slice(b"\x1b[?25h");
        }

        out.write_all(&self.output)?;
        out.flush()?;

        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
        self.frames += 1;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Attrs;

    #[test]
    fn test_second_present_only_sends_changes() {
        let mut painter = Painter::new(20, 2);
        let mut sink = Vec::new();

        let area = painter.frame_mut().area();
        painter.frame_mut().set_str(0, 0, "status", Attrs::REVERSED, area);
        let first = painter.present(&mut sink).unwrap();
        assert_eq!(first.cells_changed, 6);

        let area = painter.frame_mut().area();
        painter.frame_mut().set_str(0, 0, "status", Attrs::REVERSED, area);
        painter.frame_mut().set_str(0, 1, "x", Attrs::empty(), area);
        let second = painter.present(&mut sink).unwrap();
        assert_eq!(second.cells_changed, 1);
        assert_eq!(painter.frames(), 2);
    }

    #[test]
    fn test_cursor_placement() {
        let mut painter = Painter::new(10, 3);
        painter.set_cursor(Some((4, 2)));
        let mut sink = Vec::new();
        painter.present(&mut sink).unwrap();

        let mut parser = vt100::Parser::new(3, 10, 0);
        parser.process(&sink);
        assert_eq!(parser.screen().cursor_position(), (2, 4));
        assert!(!parser.screen().hide_cursor());
    }

    #[test]
    fn test_resize_forces_full_repaint() {
        let mut painter = Painter::new(5, 1);
        let mut sink = Vec::new();
        painter.present(&mut sink).unwrap();

        painter.resize(8, 2);
        sink.clear();
        painter.present(&mut sink).unwrap();
        assert!(sink.windows(4).any(|w| w == b"\x1b[2J"));
        assert_eq!(painter.current().width(), 8);
    }
}
