//! Reading terminal events with a bounded wait.

use super::{InputEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{self, Event, KeyEventKind};
use std::io;
use std::time::Duration;

/// Wait at most `timeout` for one terminal event.
///
/// Returns `Ok(None)` when the wait expires or the event is one the
/// editor ignores (mouse, focus, key release).
pub fn poll_input(timeout: Duration) -> io::Result<Option<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(convert_event(event::read()?))
}

/// Convert a crossterm event.
pub fn convert_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return None;
            }
            let code = convert_key_code(key.code)?;
            Some(InputEvent::Key(KeyEvent {
                code,
                modifiers: convert_modifiers(key.modifiers),
            }))
        }
        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        Event::Paste(text) => Some(InputEvent::Paste(text)),
        Event::Mouse(_) | Event::FocusGained | Event::FocusLost => None,
    }
}

fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
    Some(match code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Delete => KeyCode::Delete,
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        event::KeyCode::Home => KeyCode::Home,
        event::KeyCode::End => KeyCode::End,
        event::KeyCode::PageUp => KeyCode::PageUp,
        event::KeyCode::PageDown => KeyCode::PageDown,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::Esc => KeyCode::Esc,
        event::KeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    })
}

fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: mods.contains(event::KeyModifiers::SHIFT),
        control: mods.contains(event::KeyModifiers::CONTROL),
        alt: mods.contains(event::KeyModifiers::ALT),
    }
}
