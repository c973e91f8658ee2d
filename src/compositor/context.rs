//! Context: everything the event loop owns, with no terminal attached.
//!
//! The [`Compositor`](super::Compositor) feeds it input events and clock
//! readings and presents what it renders. Tests drive it directly.

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use tracing::debug;

use super::ticker::Ticker;
use super::widgets::{scroll_status, InputLine, APP_NAME, OutputView, StatusLine, StreamPanel, Widget};
use crate::config::Config;
use crate::editor::{Capabilities, EditorAction, LineEditor, ScrollAccel};
use crate::event::{InputEvent, KeyEvent};
use crate::history::HistoryStore;
use crate::layout::ScreenLayout;
use crate::output::{OutputBuffer, Search};
use crate::screen::{Attrs, Frame};
use crate::stream::{ConnectionState, StreamClient, StreamEvent};

/// Prompt of the nested search read.
pub const SEARCH_PROMPT: &str = "Search for: ";

/// How a line read ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Enter was pressed.
    Line(String),
    /// A one-shot read received this key.
    Key(KeyEvent),
    /// The user abandoned the line (Ctrl-C).
    Cancelled,
    /// The process was asked to stop.
    Interrupted,
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    max_line_length: usize,
    line_width: usize,
    scroll_rate: f64,
    scroll_step: f64,
    scroll_pause: Duration,
    stale_after: Duration,
}

impl Settings {
    fn from_config(config: &Config) -> Self {
        Self {
            max_line_length: config.max_line_length,
            line_width: config.line_width,
            scroll_rate: config.input.scroll_rate,
            scroll_step: config.input.scroll_step,
            scroll_pause: config.input.scroll_pause(),
            stale_after: config.stream.stale_after(),
        }
    }

    const fn scroll(&self) -> ScrollAccel {
        ScrollAccel::new(self.scroll_rate, self.scroll_step, self.scroll_pause)
    }
}

/// Event-loop state shared by every region of the screen.
#[derive(Debug)]
pub struct Context {
    output: OutputBuffer,
    history: HistoryStore,
    stream: StreamClient,
    events: Receiver<StreamEvent>,
    search: Search,
    layout: ScreenLayout,
    ticker: Ticker,
    settings: Settings,
    editor: Option<LineEditor>,
    search_prompt: Option<LineEditor>,
    message: Option<String>,
    dirty: bool,
}

impl Context {
    /// Assemble a context for an 80x24 screen; call [`Context::resize`]
    /// with the real size before the first render.
    pub fn new(
        config: &Config,
        output: OutputBuffer,
        history: HistoryStore,
        stream: StreamClient,
        events: Receiver<StreamEvent>,
        now: Instant,
    ) -> Self {
        let mut context = Self {
            output,
            history,
            stream,
            events,
            search: Search::new(),
            layout: ScreenLayout::compute(80, 24, 0),
            ticker: Ticker::new(config.stream.tick_interval(), now),
            settings: Settings::from_config(config),
            editor: None,
            search_prompt: None,
            message: None,
            dirty: true,
        };
        context.resize(80, 24);
        context
    }

    /// Scrollback.
    pub const fn output(&self) -> &OutputBuffer {
        &self.output
    }

    /// Mutable scrollback.
    pub fn output_mut(&mut self) -> &mut OutputBuffer {
        self.dirty = true;
        &mut self.output
    }

    /// Command history.
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Mutable command history.
    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Stream client.
    pub const fn stream(&self) -> &StreamClient {
        &self.stream
    }

    /// Mutable stream client.
    pub fn stream_mut(&mut self) -> &mut StreamClient {
        self.dirty = true;
        &mut self.stream
    }

    /// Current layout.
    pub const fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    /// The read in progress, if any.
    pub const fn editor(&self) -> Option<&LineEditor> {
        self.editor.as_ref()
    }

    /// True while the nested search prompt is open.
    pub const fn is_searching(&self) -> bool {
        self.search_prompt.is_some()
    }

    /// Append text to the scrollback and show the newest line.
    pub fn print(&mut self, text: &str) {
        self.output.append(text);
        self.output.scroll_to_bottom();
        self.dirty = true;
    }

    /// Show `text` on the status line until the next key.
    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
        self.dirty = true;
    }

    /// What the status line currently says.
    pub fn status_text(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        let show_position = self
            .editor
            .as_ref()
            .map_or(true, |e| e.capabilities().contains(Capabilities::STATUS));
        if show_position {
            scroll_status(&self.output)
        } else {
            String::from(APP_NAME)
        }
    }

    /// True when something changed since the last render.
    pub const fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Acknowledge a render.
    pub const fn mark_drawn(&mut self) {
        self.dirty = false;
    }

    /// Recompute regions for a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.layout = ScreenLayout::compute(width, height, self.stream.subscriptions().len());
        self.apply_layout();
    }

    fn apply_layout(&mut self) {
        let viewport = self.layout.viewport_height().max(1);
        self.output.set_viewport_height(viewport);
        let width = usize::from(self.layout.size.0).max(1);
        self.output
            .set_wrap_width(self.settings.line_width.min(width));
        let limit = viewport.saturating_sub(1);
        if let Some(editor) = self.editor.as_mut() {
            editor.set_scroll_limit(limit);
        }
        if let Some(prompt) = self.search_prompt.as_mut() {
            prompt.set_scroll_limit(limit);
        }
        self.dirty = true;
    }

    /// Grow or shrink the stream panel to match the subscription count.
    pub fn sync_layout(&mut self) {
        let (width, height) = self.layout.size;
        let layout = ScreenLayout::compute(width, height, self.stream.subscriptions().len());
        if layout != self.layout {
            debug!(rows = layout.stream_rows(), "stream panel resized");
            self.layout = layout;
            self.apply_layout();
        }
    }

    /// Start reading a line.
    pub fn begin_read(&mut self, prompt: &str, caps: Capabilities, initial: &str) {
        let mut editor = LineEditor::new(prompt, caps, self.settings.max_line_length)
            .with_scroll(self.settings.scroll())
            .with_text(initial);
        editor.set_scroll_limit(self.layout.viewport_height().saturating_sub(1));
        self.editor = Some(editor);
        self.search_prompt = None;
        self.sync_layout();
        self.dirty = true;
    }

    /// Abandon the read in progress.
    pub fn cancel_read(&mut self) {
        self.editor = None;
        self.search_prompt = None;
        self.history.rewind();
        self.dirty = true;
    }

    /// Advance the stream if its tick is due and apply what it reported.
    pub fn tick(&mut self, now: Instant) {
        if self.ticker.due(now) {
            self.stream.tick(now);
            if !self.stream.subscriptions().is_empty() {
                self.dirty = true;
            }
        }
        self.drain_stream_events();
        self.sync_layout();
    }

    fn drain_stream_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                StreamEvent::Status(text) => self.message = Some(text),
                StreamEvent::StateChanged(state) => debug!(%state, "stream state changed"),
                StreamEvent::Updated(_) => {}
                StreamEvent::FrameError(reason) => {
                    debug!(%reason, "stream frame dropped");
                    continue;
                }
            }
            self.dirty = true;
        }
    }

    /// Apply one input event. Returns the outcome when the read ends.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Option<ReadOutcome> {
        match event {
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                None
            }
            InputEvent::Paste(text) => {
                let target = self.search_prompt.as_mut().or(self.editor.as_mut())?;
                if target.paste(&text) != EditorAction::Ignored {
                    self.dirty = true;
                }
                None
            }
            InputEvent::Key(key) => self.handle_key(key, now),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<ReadOutcome> {
        if self.message.take().is_some() {
            self.dirty = true;
        }
        if self.search_prompt.is_some() {
            self.handle_search_key(key, now);
            return None;
        }

        let editor = self.editor.as_mut()?;
        match editor.handle_key(key, &mut self.history, now) {
            EditorAction::Ignored => None,
            EditorAction::Redraw => {
                self.dirty = true;
                None
            }
            EditorAction::Scroll(rows) => {
                self.dirty |= self.output.scroll(rows);
                None
            }
            EditorAction::BeginSearch => {
                let mut prompt = LineEditor::new(
                    SEARCH_PROMPT,
                    Capabilities::EDIT | Capabilities::HISTORY | Capabilities::SCROLL,
                    self.settings.max_line_length,
                )
                .with_scroll(self.settings.scroll());
                prompt.set_scroll_limit(self.layout.viewport_height().saturating_sub(1));
                self.search_prompt = Some(prompt);
                self.dirty = true;
                None
            }
            EditorAction::RepeatSearch => {
                let outcome = self.search.repeat(&mut self.output);
                self.message = Some(outcome.status_text());
                self.dirty = true;
                None
            }
            EditorAction::Submitted(line) => {
                let echo = if editor.capabilities().contains(Capabilities::HIDDEN) {
                    editor.prompt().to_string()
                } else {
                    format!("{}{line}", editor.prompt())
                };
                self.editor = None;
                self.print(&echo);
                Some(ReadOutcome::Line(line))
            }
            EditorAction::Cancelled => {
                self.editor = None;
                self.dirty = true;
                Some(ReadOutcome::Cancelled)
            }
            EditorAction::OneShot(key) => {
                self.editor = None;
                self.dirty = true;
                Some(ReadOutcome::Key(key))
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        let Some(prompt) = self.search_prompt.as_mut() else {
            return;
        };
        match prompt.handle_key(key, &mut self.history, now) {
            EditorAction::Submitted(term) => {
                self.search_prompt = None;
                if !term.is_empty() {
                    self.history.remember(&term);
                }
                let outcome = self.search.start(&term, &mut self.output);
                self.message = Some(outcome.status_text());
            }
            EditorAction::Cancelled => self.search_prompt = None,
            EditorAction::Scroll(rows) => {
                self.output.scroll(rows);
            }
            EditorAction::Ignored => return,
            _ => {}
        }
        self.dirty = true;
    }

    fn connection_label(&self) -> String {
        let state = self.stream.state();
        if state == ConnectionState::Disconnected && self.stream.subscriptions().is_empty() {
            String::new()
        } else {
            format!("[{state}]")
        }
    }

    /// Draw the whole screen. Returns where the cursor belongs.
    pub fn render(&self, frame: &mut Frame, now: Instant) -> Option<(u16, u16)> {
        let layout = &self.layout;
        let mut cursor = None;

        if let Some(prompt) = &self.search_prompt {
            let line = InputLine {
                prompt: prompt.prompt(),
                text: prompt.text(),
                cursor: prompt.cursor_column(),
                hidden: false,
                attrs: Attrs::REVERSED,
            };
            line.render(frame, layout.status);
            cursor = line.cursor_position(layout.status);
        } else {
            let text = self.status_text();
            let right = self.connection_label();
            StatusLine { text: &text, right: &right }.render(frame, layout.status);
        }

        StreamPanel {
            subscriptions: self.stream.subscriptions(),
            now,
            stale_after: self.settings.stale_after,
        }
        .render(frame, layout.stream);

        let viewport_rows = u16::try_from(layout.viewport_height()).unwrap_or(u16::MAX);
        let (viewport, _) = layout.output.split_vertical(viewport_rows);
        OutputView { buffer: &self.output }.render(frame, viewport);

        if let Some(editor) = &self.editor {
            let line = InputLine {
                prompt: editor.prompt(),
                text: editor.text(),
                cursor: editor.cursor_column(),
                hidden: editor.capabilities().contains(Capabilities::HIDDEN),
                attrs: Attrs::empty(),
            };
            let input = layout.input_row();
            line.render(frame, input);
            if cursor.is_none() {
                cursor = line.cursor_position(input);
            }
        }
        cursor
    }
}
