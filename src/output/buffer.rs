//! OutputBuffer: bounded scrollback with a viewport.

use std::collections::VecDeque;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// What an append did to the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendReport {
    /// Lines added (after wrapping).
    pub added: usize,
    /// Oldest lines dropped to stay within capacity.
    pub evicted: usize,
}

/// A located occurrence of a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Absolute line number (0-based, counted over the whole session).
    pub line: u64,
    /// Display column of the first matched character.
    pub column: usize,
    /// Byte offset of the match within the line.
    pub byte: usize,
    /// Display width of the match.
    pub width: usize,
}

/// Append-only log of rendered lines, bounded to `capacity`.
///
/// Lines are addressed two ways. The viewport uses indices into the lines
/// currently held. Everything cached across appends (search positions,
/// highlights) uses absolute line numbers, which survive eviction:
/// line `n` is held at index `n - first_line_number()`.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    lines: VecDeque<String>,
    capacity: usize,
    wrap_width: usize,
    total_written: u64,
    viewport_top: usize,
    viewport_height: usize,
    highlights: Vec<Hit>,
}

impl OutputBuffer {
    /// Empty buffer holding at most `capacity` lines wrapped at `wrap_width`
    /// columns (0 disables wrapping).
    pub fn new(capacity: usize, wrap_width: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
            wrap_width,
            total_written: 0,
            viewport_top: 0,
            viewport_height: 1,
            highlights: Vec::new(),
        }
    }

    /// Set the viewport height (builder form).
    #[must_use]
    pub fn with_viewport_height(mut self, height: usize) -> Self {
        self.set_viewport_height(height);
        self
    }

    /// Maximum lines held.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines currently held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing has been appended (or everything was cleared).
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines appended over the buffer's lifetime, evicted ones included.
    pub const fn total_lines_written(&self) -> u64 {
        self.total_written
    }

    /// Absolute number of the oldest line still held.
    pub fn first_line_number(&self) -> u64 {
        self.total_written - self.lines.len() as u64
    }

    /// Index of the first visible line.
    pub const fn viewport_top(&self) -> usize {
        self.viewport_top
    }

    /// Rows in the viewport.
    pub const fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Column at which appended text wraps.
    pub const fn wrap_width(&self) -> usize {
        self.wrap_width
    }

    /// Change the wrap column for future appends.
    pub fn set_wrap_width(&mut self, width: usize) {
        self.wrap_width = width;
    }

    fn max_top(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height)
    }

    /// True when the viewport shows the newest line.
    pub fn is_following(&self) -> bool {
        self.viewport_top >= self.max_top()
    }

    /// Resize the viewport. A viewport showing the tail keeps showing it.
    pub fn set_viewport_height(&mut self, height: usize) {
        let following = self.is_following();
        self.viewport_height = height.max(1);
        if following {
            self.viewport_top = self.max_top();
        } else {
            self.viewport_top = self.viewport_top.min(self.max_top());
        }
    }

    /// Append `text`, one line per `\n`-separated piece, each wrapped.
    ///
    /// A single trailing newline does not produce an extra empty line.
    /// Eviction costs O(evicted).
    pub fn append(&mut self, text: &str) -> AppendReport {
        let following = self.is_following();
        let body = text.strip_suffix('\n').unwrap_or(text);

        let mut added = 0;
        for piece in body.split('\n') {
            let piece = piece.strip_suffix('\r').unwrap_or(piece);
            for row in wrap(piece, self.wrap_width) {
                self.lines.push_back(row);
                added += 1;
            }
        }
        self.total_written += added as u64;

        let mut evicted = 0;
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
            evicted += 1;
        }

        if evicted > 0 {
            let first = self.first_line_number();
            self.highlights.retain(|h| h.line >= first);
        }

        if following {
            self.viewport_top = self.max_top();
        } else {
            self.viewport_top = self.viewport_top.saturating_sub(evicted).min(self.max_top());
        }

        AppendReport { added, evicted }
    }

    /// Move the viewport by `delta` rows (negative scrolls toward older
    /// output). Returns true if it moved.
    pub fn scroll(&mut self, delta: isize) -> bool {
        let before = self.viewport_top;
        let target = if delta < 0 {
            before.saturating_sub(delta.unsigned_abs())
        } else {
            before.saturating_add(delta.unsigned_abs())
        };
        self.viewport_top = target.min(self.max_top());
        self.viewport_top != before
    }

    /// Pin the viewport to the newest line.
    pub fn scroll_to_bottom(&mut self) {
        self.viewport_top = self.max_top();
    }

    /// Put absolute line `line` at the top of the viewport (clamped).
    pub fn scroll_to_line(&mut self, line: u64) {
        let index = line.saturating_sub(self.first_line_number());
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        self.viewport_top = index.min(self.max_top());
    }

    /// The visible lines, top to bottom.
    pub fn visible_slice(&self) -> impl Iterator<Item = &str> + '_ {
        self.visible_lines().map(|(_, line)| line)
    }

    /// The visible lines with their absolute line numbers.
    pub fn visible_lines(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        let first = self.first_line_number();
        let end = (self.viewport_top + self.viewport_height).min(self.lines.len());
        let start = self.viewport_top.min(end);
        self.lines
            .range(start..end)
            .enumerate()
            .map(move |(i, line)| (first + (start + i) as u64, line.as_str()))
    }

    /// Absolute numbers of the first and last visible line, if any.
    pub fn visible_range(&self) -> Option<(u64, u64)> {
        let mut lines = self.visible_lines().map(|(n, _)| n);
        let first = lines.next()?;
        Some((first, lines.last().unwrap_or(first)))
    }

    /// Line by absolute number.
    pub fn line(&self, line: u64) -> Option<&str> {
        let index = usize::try_from(line.checked_sub(self.first_line_number())?).ok()?;
        self.lines.get(index).map(String::as_str)
    }

    /// All held lines, oldest first.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// Find the nearest occurrence of `term` on a line strictly before
    /// absolute line `before` (or anywhere, searching from the newest line,
    /// when `before` is `None`). Matching is case-sensitive and takes the
    /// leftmost occurrence on a line.
    pub fn find_backward(&self, term: &str, before: Option<u64>) -> Option<Hit> {
        if term.is_empty() {
            return None;
        }
        let first = self.first_line_number();
        let end = before.map_or(self.lines.len(), |b| {
            usize::try_from(b.saturating_sub(first))
                .unwrap_or(usize::MAX)
                .min(self.lines.len())
        });
        (0..end).rev().find_map(|index| {
            let text = &self.lines[index];
            let byte = text.find(term)?;
            Some(Hit {
                line: first + index as u64,
                column: text[..byte].width(),
                byte,
                width: term.width(),
            })
        })
    }

    /// Mark a hit to be drawn emphasised until it is evicted.
    pub fn highlight(&mut self, hit: Hit) {
        if !self.highlights.contains(&hit) {
            self.highlights.push(hit);
        }
    }

    /// Highlights inside the viewport as (row, column, width).
    pub fn visible_highlights(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let top = self.first_line_number() + self.viewport_top as u64;
        let bottom = top + self.viewport_height as u64;
        self.highlights
            .iter()
            .filter(move |h| h.line >= top && h.line < bottom)
            .map(move |h| ((h.line - top) as usize, h.column, h.width))
    }

    /// Drop every line. Line numbering continues where it left off.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.highlights.clear();
        self.viewport_top = 0;
    }
}

/// Split `text` into rows no wider than `width` display columns.
///
/// Always yields at least one row; `width == 0` disables wrapping.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.width() <= width {
        return vec![text.to_string()];
    }
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if row_width + w > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        row.push_str(grapheme);
        row_width += w;
    }
    rows.push(row);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, count: usize) -> OutputBuffer {
        let mut buffer = OutputBuffer::new(capacity, 80).with_viewport_height(3);
        for i in 1..=count {
            buffer.append(&format!("line {i}"));
        }
        buffer
    }

    #[test]
    fn test_capacity_keeps_newest_lines() {
        let buffer = filled(10, 12);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.total_lines_written(), 12);
        let lines: Vec<_> = buffer.lines().collect();
        assert_eq!(lines.first(), Some(&"line 3"));
        assert_eq!(lines.last(), Some(&"line 12"));
        assert_eq!(buffer.first_line_number(), 2);
    }

    #[test]
    fn test_bound_holds_for_multiline_appends() {
        let mut buffer = OutputBuffer::new(5, 80);
        for round in 0..20 {
            let report = buffer.append(&"x\n".repeat(round % 4 + 1));
            assert!(buffer.len() <= 5);
            assert_eq!(report.added, round % 4 + 1);
        }
        assert_eq!(buffer.total_lines_written(), 50);
    }

    #[test]
    fn test_append_reports_eviction() {
        let mut buffer = OutputBuffer::new(3, 80);
        assert_eq!(buffer.append("a\nb"), AppendReport { added: 2, evicted: 0 });
        assert_eq!(buffer.append("c\nd\ne"), AppendReport { added: 3, evicted: 2 });
        assert_eq!(buffer.lines().collect::<Vec<_>>(), vec!["c", "d", "e"]);
    }

    #[test]
    fn test_trailing_newline_and_empty_line() {
        let mut buffer = OutputBuffer::new(10, 80);
        assert_eq!(buffer.append("one\n").added, 1);
        assert_eq!(buffer.append("").added, 1);
        assert_eq!(buffer.lines().collect::<Vec<_>>(), vec!["one", ""]);
    }

    #[test]
    fn test_wrapping() {
        let mut buffer = OutputBuffer::new(10, 4);
        let report = buffer.append("abcdefghij");
        assert_eq!(report.added, 3);
        assert_eq!(buffer.lines().collect::<Vec<_>>(), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut buffer = filled(100, 10);
        assert_eq!(buffer.viewport_top(), 7);
        assert!(buffer.scroll(-5));
        assert_eq!(buffer.viewport_top(), 2);
        assert!(buffer.scroll(-50));
        assert_eq!(buffer.viewport_top(), 0);
        assert!(!buffer.scroll(-1));
        assert!(buffer.scroll(50));
        assert_eq!(buffer.viewport_top(), 7);
    }

    #[test]
    fn test_follow_tail() {
        let mut buffer = filled(100, 5);
        assert!(buffer.is_following());
        buffer.append("next");
        assert_eq!(buffer.visible_slice().last(), Some("next"));

        buffer.scroll(-2);
        assert!(!buffer.is_following());
        buffer.append("later");
        assert_eq!(buffer.viewport_top(), 1);
    }

    #[test]
    fn test_viewport_shifts_with_eviction() {
        let mut buffer = filled(10, 10);
        buffer.scroll(-5);
        assert_eq!(buffer.viewport_top(), 2);
        let shown = buffer.visible_slice().next().map(String::from);
        buffer.append("a\nb");
        assert_eq!(buffer.viewport_top(), 0);
        assert_eq!(buffer.visible_slice().next().map(String::from), shown);
    }

    #[test]
    fn test_visible_range_uses_absolute_numbers() {
        let buffer = filled(5, 12);
        assert_eq!(buffer.visible_range(), Some((9, 11)));
        assert_eq!(buffer.line(11), Some("line 12"));
        assert_eq!(buffer.line(6), None);
    }

    #[test]
    fn test_find_backward() {
        let mut buffer = OutputBuffer::new(100, 80);
        buffer.append("alpha beta\ngamma\nbeta beta\ndelta");
        let hit = buffer.find_backward("beta", None).unwrap();
        assert_eq!((hit.line, hit.column), (2, 0));

        let again = buffer.find_backward("beta", Some(hit.line)).unwrap();
        assert_eq!((again.line, again.column), (0, 6));
        assert!(buffer.find_backward("beta", Some(again.line)).is_none());
        assert!(buffer.find_backward("Beta", None).is_none());
        assert!(buffer.find_backward("", None).is_none());
    }

    #[test]
    fn test_highlight_visibility_and_eviction() {
        let mut buffer = OutputBuffer::new(4, 80).with_viewport_height(4);
        buffer.append("x\nneedle\ny\nz");
        let hit = buffer.find_backward("needle", None).unwrap();
        buffer.highlight(hit);
        assert_eq!(buffer.visible_highlights().collect::<Vec<_>>(), vec![(1, 0, 6)]);

        buffer.append("1\n2");
        assert_eq!(buffer.visible_highlights().count(), 0);
    }
}
