use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    // Intercepted by the root
    Quit,
    Advance,
    Retreat,
    Resize { width: u16, height: u16 },
    ConnectivityTick,

    // Forwarded to the active step
    Connectivity(bool),
    Enter,
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    Home,
    End,
}

/// Map a raw crossterm event to a `TuiEvent`, if it means anything to us.
pub fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key) => translate_key(key),
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(width, height) => Some(TuiEvent::Resize { width, height }),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<TuiEvent> {
    // With REPORT_EVENT_TYPES some terminals also send releases
    if key.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);
    match (key.modifiers, key.code) {
        (m, KeyCode::Char('c' | 'C')) if m.contains(KeyModifiers::CONTROL) => Some(TuiEvent::Quit),
        (_, KeyCode::Tab) => Some(TuiEvent::Advance),
        (_, KeyCode::Esc) | (_, KeyCode::BackTab) => Some(TuiEvent::Retreat),
        // Only unmodified or shifted characters are text
        (m, KeyCode::Char(c)) if (KeyModifiers::SHIFT).contains(m) => Some(TuiEvent::InputChar(c)),
        (_, KeyCode::Char(_)) => None,
        (_, KeyCode::Enter) => Some(TuiEvent::Enter),
        (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
        (_, KeyCode::Delete) => Some(TuiEvent::Delete),
        (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
        (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
        (_, KeyCode::Left) => Some(TuiEvent::CursorLeft),
        (_, KeyCode::Right) => Some(TuiEvent::CursorRight),
        (_, KeyCode::Home) => Some(TuiEvent::Home),
        (_, KeyCode::End) => Some(TuiEvent::End),
        _ => None,
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> io::Result<Option<TuiEvent>> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
///
/// Events we don't care about are consumed and reported as `None`.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<TuiEvent>> {
    if event::poll(timeout)? {
        Ok(translate(event::read()?))
    } else {
        Ok(None)
    }
}
