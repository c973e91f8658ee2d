//! Compositor: the single event loop, bound to the real terminal.
//!
//! One iteration:
//! 1. honour a pending SIGINT,
//! 2. tick the stream if due and apply its events,
//! 3. redraw if anything changed,
//! 4. wait up to the key-poll timeout for input,
//! 5. dispatch it (resizes re-pin every region).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::context::{Context, ReadOutcome};
use crate::editor::Capabilities;
use crate::error::{Error, Result};
use crate::event::{poll_input, InputEvent};
use crate::screen::{Painter, Terminal};

/// Owns the terminal, the painter and the [`Context`].
pub struct Compositor {
    terminal: Terminal,
    painter: Painter,
    context: Context,
    stop: Arc<AtomicBool>,
    key_poll: Duration,
}

impl Compositor {
    /// Take over the terminal and register the SIGINT flag.
    pub fn new(mut context: Context, key_poll: Duration) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))
            .map_err(Error::Terminal)?;

        let terminal = Terminal::enter()?;
        let (width, height) = terminal.size()?;
        context.resize(width, height);
        info!(width, height, "compositor started");

        Ok(Self {
            terminal,
            painter: Painter::new(width, height),
            context,
            stop,
            key_poll,
        })
    }

    /// Shared state.
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable shared state.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// True once SIGINT was received and not yet consumed.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Read one line with an empty initial text.
    pub fn read_line(&mut self, prompt: &str, caps: Capabilities) -> Result<ReadOutcome> {
        self.read_line_with(prompt, caps, "")
    }

    /// Read one line starting from `initial`.
    pub fn read_line_with(
        &mut self,
        prompt: &str,
        caps: Capabilities,
        initial: &str,
    ) -> Result<ReadOutcome> {
        self.context.begin_read(prompt, caps, initial);
        loop {
            if self.stop.load(Ordering::Relaxed) {
                debug!("interrupted");
                self.context.cancel_read();
                self.redraw()?;
                return Ok(ReadOutcome::Interrupted);
            }

            self.context.tick(Instant::now());
            if self.context.needs_redraw() {
                self.redraw()?;
            }

            let Some(event) = poll_input(self.key_poll).map_err(Error::Terminal)? else {
                continue;
            };
            if let InputEvent::Resize { width, height } = event {
                self.painter.resize(width, height);
            }
            if let Some(outcome) = self.context.handle_event(event, Instant::now()) {
                self.redraw()?;
                return Ok(outcome);
            }
        }
    }

    /// Render the context and present it.
    pub fn redraw(&mut self) -> Result<()> {
        let cursor = self.context.render(self.painter.frame_mut(), Instant::now());
        self.painter.set_cursor(cursor);
        self.painter
            .present(self.terminal.writer())
            .map_err(Error::Terminal)?;
        self.context.mark_drawn();
        Ok(())
    }

    /// Close the stream and give the terminal back. Returns the context
    /// so its state can be persisted.
    pub fn finish(mut self) -> Result<Context> {
        self.context.stream_mut().shutdown_now();
        self.terminal.leave()?;
        info!(frames = self.painter.frames(), "compositor stopped");
        Ok(self.context)
    }
}
