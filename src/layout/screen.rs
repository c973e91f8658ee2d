//! Screen layout: status row, stream panel, output region.

use super::rect::Rect;

/// Positions of the three fixed regions for one terminal size.
///
/// The status row is pinned to the top. The stream panel sits under it
/// with one row per subscription, never taller than half the terminal.
/// The output region takes the rest; its last row is the input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Terminal size as (columns, rows).
    pub size: (u16, u16),
    /// One-row status line.
    pub status: Rect,
    /// Live subscription rows. Empty when nothing is subscribed.
    pub stream: Rect,
    /// Scrollback plus the input line.
    pub output: Rect,
}

impl ScreenLayout {
    /// Compute regions for a `width` x `height` terminal with
    /// `subscriptions` panel rows requested.
    pub fn compute(width: u16, height: u16, subscriptions: usize) -> Self {
        let screen = Rect::from_size(width, height);
        let (status, rest) = screen.split_vertical(1);

        let cap = height / 2;
        let wanted = u16::try_from(subscriptions).unwrap_or(u16::MAX);
        let (stream, output) = rest.split_vertical(wanted.min(cap));

        Self {
            size: (width, height),
            status,
            stream,
            output,
        }
    }

    /// Rows of scrollback visible above the input line.
    pub const fn viewport_height(&self) -> usize {
        self.output.height.saturating_sub(1) as usize
    }

    /// The input line (last row of the output region).
    pub const fn input_row(&self) -> Rect {
        if self.output.height == 0 {
            return Rect::ZERO;
        }
        self.output.row(self.output.height - 1)
    }

    /// Number of subscription rows that fit.
    pub const fn stream_rows(&self) -> usize {
        self.stream.height as usize
    }
}
