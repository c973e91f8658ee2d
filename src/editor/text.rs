//! EditBuffer: bounded single-line text with a cursor.

use unicode_width::UnicodeWidthStr;

/// Owned line of text with a cursor, never longer than `max_chars`.
///
/// The cursor is a character index in `0..=len`. Insertions and
/// deletions in the middle shift the tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
    max_chars: usize,
}

impl EditBuffer {
    /// Empty buffer.
    pub const fn new(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            max_chars,
        }
    }

    /// Current text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character limit.
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Cursor as a character index.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.byte_at(self.cursor)].width()
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert at the cursor. Returns false when full.
    pub fn insert(&mut self, c: char) -> bool {
        if self.len() >= self.max_chars || c.is_control() {
            return false;
        }
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    /// Insert as much of `s` as fits. Returns the characters inserted.
    pub fn insert_str(&mut self, s: &str) -> usize {
        s.chars().take_while(|&c| self.insert(c)).count()
    }

    /// Delete before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
        true
    }

    /// Delete under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
        true
    }

    /// Cursor one left.
    pub fn left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Cursor one right.
    pub fn right(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Cursor to the start.
    pub fn home(&mut self) -> bool {
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    /// Cursor to the end.
    pub fn end(&mut self) -> bool {
        let len = self.len();
        let moved = self.cursor != len;
        self.cursor = len;
        moved
    }

    /// Replace the text (truncated to the limit), cursor at the end.
    pub fn set(&mut self, text: &str) {
        self.text = text.chars().filter(|c| !c.is_control()).take(self.max_chars).collect();
        self.cursor = self.len();
    }

    /// Take the text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_line_insert_and_delete() {
        let mut text = EditBuffer::new(100);
        text.set("helo");
        text.left();
        assert!(text.insert('l'));
        assert_eq!(text.as_str(), "hello");
        assert_eq!(text.cursor(), 4);

        text.home();
        text.right();
        assert!(text.delete());
        assert_eq!(text.as_str(), "hllo");
        assert!(text.backspace());
        assert_eq!(text.as_str(), "llo");
        assert_eq!(text.cursor(), 0);
        assert!(!text.backspace());
    }

    #[test]
    fn test_limit() {
        let mut text = EditBuffer::new(3);
        assert_eq!(text.insert_str("abcdef"), 3);
        assert!(!text.insert('x'));
        assert_eq!(text.as_str(), "abc");
        text.set("0123456");
        assert_eq!(text.as_str(), "012");
        assert_eq!(text.cursor(), 3);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut text = EditBuffer::new(10);
        text.insert_str("a日b");
        assert_eq!(text.cursor_column(), 4);
        text.left();
        assert_eq!(text.cursor_column(), 3);
        text.backspace();
        assert_eq!(text.as_str(), "ab");
        assert_eq!(text.cursor(), 1);
    }

    #[test]
    fn test_take() {
        let mut text = EditBuffer::new(10);
        text.insert_str("cmd");
        assert_eq!(text.take(), "cmd");
        assert!(text.is_empty());
        assert_eq!(text.cursor(), 0);
        assert!(!text.delete());
    }
}
