//! Widgets: the pieces of the screen, each drawn into its own region.

use std::time::{Duration, Instant};

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::layout::Rect;
use crate::output::OutputBuffer;
use crate::screen::{Attrs, Frame};
use crate::stream::{panel, SubscriptionList};

/// Something that can draw itself into a rectangle of a frame.
///
/// Widgets must not write outside `area`.
pub trait Widget {
    /// Draw into `area`.
    fn render(&self, frame: &mut Frame, area: Rect);
}

/// Application name shown on the status line.
pub const APP_NAME: &str = "Options Numerics";

/// Status text for the current viewport position.
pub fn scroll_status(output: &OutputBuffer) -> String {
    let Some((first, last)) = output.visible_range() else {
        return String::from(APP_NAME);
    };
    let mut text = format!(
        "{APP_NAME}; showing lines {} - {} of {}",
        first + 1,
        last + 1,
        output.total_lines_written()
    );
    if first > 0 {
        text.push_str(" <output above>");
    }
    text
}

/// The reverse-video status row.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    /// Left-aligned message.
    pub text: &'a str,
    /// Right-aligned annotation (connection state).
    pub right: &'a str,
}

impl Widget for StatusLine<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        if area.is_empty() {
            return;
        }
        frame.fill(area, Attrs::REVERSED);
        let written = frame.set_str(area.x, area.y, self.text, Attrs::REVERSED, area);

        let right_width = u16::try_from(self.right.width()).unwrap_or(u16::MAX);
        if !self.right.is_empty() && written + right_width < area.width {
            let x = area.right() - right_width;
            frame.set_str(x, area.y, self.right, Attrs::REVERSED, area);
        }
    }
}

/// One row per subscription, stale rows dimmed.
#[derive(Debug, Clone, Copy)]
pub struct StreamPanel<'a> {
    /// Subscriptions to show, in order.
    pub subscriptions: &'a SubscriptionList,
    /// Time used for ages and staleness.
    pub now: Instant,
    /// Age beyond which a row is dimmed.
    pub stale_after: Duration,
}

impl Widget for StreamPanel<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        for (row, sub) in (0..area.height).zip(self.subscriptions.iter()) {
            let attrs = if panel::is_stale(sub, self.now, self.stale_after) {
                Attrs::DIM
            } else {
                Attrs::empty()
            };
            let line = panel::format_row(sub, self.now);
            frame.set_str(area.x, area.y + row, &line, attrs, area);
        }
    }
}

/// The visible part of the scrollback with search hits emphasised.
#[derive(Debug, Clone, Copy)]
pub struct OutputView<'a> {
    /// Scrollback.
    pub buffer: &'a OutputBuffer,
}

impl Widget for OutputView<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        for (row, line) in (0..area.height).zip(self.buffer.visible_slice()) {
            frame.set_str(area.x, area.y + row, line, Attrs::empty(), area);
        }
        for (row, column, width) in self.buffer.visible_highlights() {
            let (Ok(row), Ok(column), Ok(width)) = (
                u16::try_from(row),
                u16::try_from(column),
                u16::try_from(width),
            ) else {
                continue;
            };
            if row >= area.height || column >= area.width {
                continue;
            }
            let span = Rect::new(
                area.x + column,
                area.y + row,
                width.min(area.width - column),
                1,
            );
            frame.add_attrs(span, Attrs::BOLD | Attrs::UNDERLINE);
        }
    }
}

/// A prompt followed by editable text, scrolled horizontally to keep the
/// cursor in view.
#[derive(Debug, Clone, Copy)]
pub struct InputLine<'a> {
    /// Prompt.
    pub prompt: &'a str,
    /// Text being edited.
    pub text: &'a str,
    /// Cursor display column within `text`.
    pub cursor: usize,
    /// Draw the prompt only (passwords, tokens).
    pub hidden: bool,
    /// Attributes for the whole line.
    pub attrs: Attrs,
}

impl InputLine<'_> {
    fn text_area(&self, area: Rect) -> (u16, usize) {
        let prompt = u16::try_from(self.prompt.width()).unwrap_or(u16::MAX);
        let prompt = prompt.min(area.width);
        (prompt, usize::from(area.width - prompt))
    }

    /// Columns of `text` skipped so the cursor stays visible.
    pub fn scroll_offset(&self, area: Rect) -> usize {
        let (_, available) = self.text_area(area);
        if self.hidden || available == 0 || self.cursor < available {
            0
        } else {
            self.cursor + 1 - available
        }
    }

    /// Screen position of the cursor.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        if area.is_empty() {
            return None;
        }
        let (prompt, available) = self.text_area(area);
        let column = if self.hidden {
            0
        } else {
            (self.cursor - self.scroll_offset(area)).min(available.saturating_sub(1))
        };
        let column = u16::try_from(column).unwrap_or(0);
        Some(((area.x + prompt + column).min(area.right().saturating_sub(1)), area.y))
    }
}

impl Widget for InputLine<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        if area.is_empty() {
            return;
        }
        frame.fill(area, self.attrs);
        let (prompt, _) = self.text_area(area);
        frame.set_str(area.x, area.y, self.prompt, self.attrs, area);
        if self.hidden || prompt >= area.width {
            return;
        }

        let offset = self.scroll_offset(area);
        let mut skipped = 0;
        let mut start = self.text.len();
        for (byte, grapheme) in self.text.grapheme_indices(true) {
            if skipped >= offset {
                start = byte;
                break;
            }
            skipped += grapheme.width();
        }
        frame.set_str(area.x + prompt, area.y, &self.text[start..], self.attrs, area);
    }
}
