//! Terminal: raw mode and alternate screen for the lifetime of a session.

use crate::error::{Error, Result};
use crossterm::{cursor, event, execute, terminal};
use std::io::{self, Stdout, Write};
use std::panic;

/// RAII guard over the controlling terminal.
///
/// Construction enters raw mode and the alternate screen and enables
/// bracketed paste. Dropping the guard undoes all three.
pub struct Terminal {
    stdout: Stdout,
    active: bool,
}

impl Terminal {
    /// Take over the terminal.
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().map_err(Error::Terminal)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableBracketedPaste,
            cursor::Hide
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(Error::Terminal(e));
        }
        tracing::debug!("terminal entered raw mode");
        Ok(Self {
            stdout,
            active: true,
        })
    }

    /// Current size as (columns, rows).
    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size().map_err(Error::Terminal)
    }

    /// Writer for presenting frames.
    pub fn writer(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    /// Restore the terminal now instead of at drop.
    pub fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        restore_terminal().map_err(Error::Terminal)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = restore_terminal();
        }
    }
}

/// Put the terminal back into cooked mode on the main screen.
pub fn restore_terminal() -> io::Result<()> {
    let _ = terminal::disable_raw_mode();
    let mut stdout = io::stdout();
    execute!(
        stdout,
        event::DisableBracketedPaste,
        terminal::LeaveAlternateScreen,
        cursor::Show
    )?;
    stdout.flush()
}

/// Restore the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));
}
