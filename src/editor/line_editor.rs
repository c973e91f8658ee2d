//! LineEditor: keystroke state machine for one line read.

use super::caps::Capabilities;
use super::scroll::{Direction, ScrollAccel};
use super::text::EditBuffer;
use crate::event::{KeyCode, KeyEvent};
use crate::history::HistoryStore;
use std::time::{Duration, Instant};

/// Lifecycle of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Nothing typed yet.
    Idle,
    /// Text is being edited.
    Editing,
    /// Enter was pressed.
    Submitted,
    /// The read was abandoned.
    Cancelled,
}

/// What the compositor should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Nothing changed.
    Ignored,
    /// The input line changed.
    Redraw,
    /// Move the output viewport by this many rows (negative is up).
    Scroll(isize),
    /// Open the nested search prompt.
    BeginSearch,
    /// Repeat the last search.
    RepeatSearch,
    /// The line is complete.
    Submitted(String),
    /// The line was abandoned.
    Cancelled,
    /// A one-shot read received its key.
    OneShot(KeyEvent),
}

/// Text typed before history recall started, restored if the user backs
/// out without submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecallSession {
    pending: String,
}

/// Tab completion in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Completion {
    prefix: String,
    index: usize,
}

/// Single-line editor.
#[derive(Debug, Clone)]
pub struct LineEditor {
    prompt: String,
    text: EditBuffer,
    caps: Capabilities,
    state: EditorState,
    recall: Option<RecallSession>,
    completion: Option<Completion>,
    scroll: ScrollAccel,
    scroll_limit: usize,
}

impl LineEditor {
    /// Editor for one read with the given prompt and capabilities.
    pub fn new(prompt: impl Into<String>, caps: Capabilities, max_chars: usize) -> Self {
        Self {
            prompt: prompt.into(),
            text: EditBuffer::new(max_chars),
            caps,
            state: EditorState::Idle,
            recall: None,
            completion: None,
            scroll: ScrollAccel::new(5.0, 2.0, Duration::from_millis(250)),
            scroll_limit: 1,
        }
    }

    /// Use a custom scroll accelerator (builder form).
    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollAccel) -> Self {
        self.scroll = scroll;
        self
    }

    /// Start with `text` already in the line (builder form).
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text.set(text);
        if !text.is_empty() {
            self.state = EditorState::Editing;
        }
        self
    }

    /// Largest single scroll step, normally the viewport height less one.
    pub fn set_scroll_limit(&mut self, rows: usize) {
        self.scroll_limit = rows.max(1);
    }

    /// Prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Current text.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Cursor display column within the text.
    pub fn cursor_column(&self) -> usize {
        self.text.cursor_column()
    }

    /// Capabilities.
    pub const fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Lifecycle state.
    pub const fn state(&self) -> EditorState {
        self.state
    }

    /// True while history recall is in progress.
    pub const fn is_recalling(&self) -> bool {
        self.recall.is_some()
    }

    /// Replace the text, keeping any recall session.
    pub fn set_text(&mut self, text: &str) {
        self.text.set(text);
        self.state = EditorState::Editing;
    }

    /// Insert pasted text at the cursor.
    pub fn paste(&mut self, text: &str) -> EditorAction {
        if !self.caps.contains(Capabilities::EDIT) {
            return EditorAction::Ignored;
        }
        let line = text.lines().next().unwrap_or_default();
        if self.text.insert_str(line) == 0 {
            return EditorAction::Ignored;
        }
        self.state = EditorState::Editing;
        self.completion = None;
        EditorAction::Redraw
    }

    /// Classify and apply one key.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        history: &mut HistoryStore,
        now: Instant,
    ) -> EditorAction {
        if matches!(self.state, EditorState::Submitted | EditorState::Cancelled) {
            return EditorAction::Ignored;
        }
        if self.caps.contains(Capabilities::ONE_SHOT) {
            self.state = EditorState::Submitted;
            return EditorAction::OneShot(key);
        }
        if key.code != KeyCode::Tab {
            self.completion = None;
        }
        if !matches!(key.code, KeyCode::PageUp | KeyCode::PageDown) {
            self.scroll.reset();
        }

        if key.is_ctrl('c') {
            return self.cancel(history);
        }
        if key.is_ctrl('f') {
            return self.when(Capabilities::SEARCH, EditorAction::BeginSearch);
        }
        if key.is_ctrl('r') {
            return self.when(Capabilities::SEARCH, EditorAction::RepeatSearch);
        }
        if key.is_ctrl('p') {
            return self.recall_most_used(history);
        }
        if key.modifiers.control || key.modifiers.alt {
            return EditorAction::Ignored;
        }

        match key.code {
            KeyCode::Enter => self.submit(history),
            KeyCode::Char(c) => self.edit(|text| text.insert(c)),
            KeyCode::Backspace => self.edit(EditBuffer::backspace),
            KeyCode::Delete => self.edit(EditBuffer::delete),
            KeyCode::Left => self.edit(EditBuffer::left),
            KeyCode::Right => self.edit(EditBuffer::right),
            KeyCode::Home => self.edit(EditBuffer::home),
            KeyCode::End => self.edit(EditBuffer::end),
            KeyCode::Up => self.recall_previous(history),
            KeyCode::Down => self.recall_next(history),
            KeyCode::Tab => self.complete(history),
            KeyCode::Esc => self.back_out(history),
            KeyCode::PageUp => self.page(Direction::Up, now),
            KeyCode::PageDown => self.page(Direction::Down, now),
            KeyCode::F(_) => EditorAction::Ignored,
        }
    }

    fn when(&self, cap: Capabilities, action: EditorAction) -> EditorAction {
        if self.caps.contains(cap) {
            action
        } else {
            EditorAction::Ignored
        }
    }

    fn edit(&mut self, op: impl FnOnce(&mut EditBuffer) -> bool) -> EditorAction {
        if !self.caps.contains(Capabilities::EDIT) {
            return EditorAction::Ignored;
        }
        if op(&mut self.text) {
            self.state = EditorState::Editing;
            EditorAction::Redraw
        } else {
            EditorAction::Ignored
        }
    }

    fn submit(&mut self, history: &mut HistoryStore) -> EditorAction {
        self.state = EditorState::Submitted;
        self.recall = None;
        self.completion = None;
        history.rewind();
        EditorAction::Submitted(self.text.take())
    }

    fn cancel(&mut self, history: &mut HistoryStore) -> EditorAction {
        self.state = EditorState::Cancelled;
        self.recall = None;
        history.rewind();
        self.text.take();
        EditorAction::Cancelled
    }

    fn recall_previous(&mut self, history: &mut HistoryStore) -> EditorAction {
        if !self.caps.contains(Capabilities::HISTORY) {
            return EditorAction::Ignored;
        }
        if self.recall.is_none() {
            history.rewind();
            self.recall = Some(RecallSession {
                pending: self.text.as_str().to_string(),
            });
        }
        match history.recall_previous() {
            Some(entry) => {
                let entry = entry.to_string();
                self.set_text(&entry);
                EditorAction::Redraw
            }
            None => {
                if history.is_empty() {
                    self.recall = None;
                }
                EditorAction::Ignored
            }
        }
    }

    fn recall_most_used(&mut self, history: &mut HistoryStore) -> EditorAction {
        if !self.caps.contains(Capabilities::HISTORY) || history.is_empty() {
            return EditorAction::Ignored;
        }
        if self.recall.is_none() {
            self.recall = Some(RecallSession {
                pending: self.text.as_str().to_string(),
            });
        }
        match history.recall_most_used() {
            Some(entry) => {
                let entry = entry.to_string();
                self.set_text(&entry);
                EditorAction::Redraw
            }
            None => EditorAction::Ignored,
        }
    }

    fn recall_next(&mut self, history: &mut HistoryStore) -> EditorAction {
        if !self.caps.contains(Capabilities::HISTORY) || self.recall.is_none() {
            return EditorAction::Ignored;
        }
        if let Some(entry) = history.recall_next() {
            let entry = entry.to_string();
            self.set_text(&entry);
            return EditorAction::Redraw;
        }
        self.restore_pending();
        EditorAction::Redraw
    }

    fn back_out(&mut self, history: &mut HistoryStore) -> EditorAction {
        if self.recall.is_none() {
            return EditorAction::Ignored;
        }
        history.rewind();
        self.restore_pending();
        EditorAction::Redraw
    }

    fn restore_pending(&mut self) {
        if let Some(session) = self.recall.take() {
            self.text.set(&session.pending);
            self.state = if session.pending.is_empty() {
                EditorState::Idle
            } else {
                EditorState::Editing
            };
        }
    }

    fn complete(&mut self, history: &HistoryStore) -> EditorAction {
        if !self.caps.contains(Capabilities::COMPLETION) {
            return EditorAction::Ignored;
        }
        let (prefix, older_than) = match &self.completion {
            Some(c) => (c.prefix.clone(), Some(c.index)),
            None => (self.text.as_str().to_string(), None),
        };
        let found = history
            .complete_prefix(&prefix, older_than)
            .or_else(|| older_than.and_then(|_| history.complete_prefix(&prefix, None)));
        match found {
            Some((index, text)) => {
                let text = text.to_string();
                self.text.set(&text);
                self.state = EditorState::Editing;
                self.completion = Some(Completion { prefix, index });
                EditorAction::Redraw
            }
            None => EditorAction::Ignored,
        }
    }

    fn page(&mut self, direction: Direction, now: Instant) -> EditorAction {
        if !self.caps.contains(Capabilities::SCROLL) {
            return EditorAction::Ignored;
        }
        let rows = self.scroll.step(direction, now, self.scroll_limit);
        let rows = isize::try_from(rows).unwrap_or(isize::MAX);
        match direction {
            Direction::Up => EditorAction::Scroll(-rows),
            Direction::Down => EditorAction::Scroll(rows),
        }
    }
}
