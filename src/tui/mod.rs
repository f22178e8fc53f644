//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the active
//! step and translates keyboard events into [`TuiEvent`] values.
//!
//! This is the only module that knows about ratatui and crossterm. The
//! prompt logic it drives lives in `core`.
//!
//! ## Event Loop
//!
//! Single-threaded. Each turn:
//!
//! 1. Draw, if anything changed since the last frame.
//! 2. Block for the first event, at most until the next connectivity check
//!    is due (and never longer than 500ms).
//! 3. Drain all pending events so a paste or key repeat costs one frame.
//! 4. Append a `ConnectivityTick` if the check deadline passed.
//! 5. Hand each event to the root and carry out the effects it returns.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during redraws.

pub mod component;
pub mod components;
pub mod event;
pub mod poller;
pub mod root;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info};

use crate::core::config::ResolvedConfig;
use crate::core::workspace::Workspace;
use crate::tui::component::{Effect, StepContext};
use crate::tui::components::Outlets;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::poller::ConnectivityPoller;
use crate::tui::root::Root;

/// Longest the loop blocks waiting for input.
const IDLE_POLL: Duration = Duration::from_millis(500);

/// What the wizard works on and delivers to.
pub struct Services {
    pub workspace: Arc<Workspace>,
    pub outlets: Outlets,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol: needed to tell Esc apart from the start of
        // an escape sequence. Terminals without it ignore the request.
        execute!(
            stdout(),
            EnableBracketedPaste,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Read every event that is already waiting, without blocking.
fn drain_pending(events: &mut Vec<TuiEvent>) -> io::Result<()> {
    while let Some(event) = poll_event_immediate()? {
        events.push(event);
    }
    Ok(())
}

/// Carry out `effect`. Returns true when the wizard should exit.
fn apply_effect(effect: Effect, poller: &mut ConnectivityPoller) -> io::Result<bool> {
    for effect in effect.into_vec() {
        match effect {
            Effect::Quit => {
                poller.cancel();
                return Ok(true);
            }
            Effect::SteadyCursor => execute!(stdout(), SetCursorStyle::SteadyBlock)?,
            Effect::ScheduleConnectivityCheck => poller.arm(Instant::now()),
            // The root turns step requests to advance into transitions.
            Effect::Advance | Effect::Batch(_) => {}
        }
    }
    Ok(false)
}

pub fn run(config: &ResolvedConfig, services: Services) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let guard = match TerminalModeGuard::new() {
        Ok(guard) => guard,
        Err(e) => {
            ratatui::restore();
            return Err(e);
        }
    };

    let result = event_loop(&mut terminal, config, services);

    drop(guard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    config: &ResolvedConfig,
    services: Services,
) -> io::Result<()> {
    let size = terminal.size()?;
    let ctx = StepContext::new(services.workspace, size.width, size.height);
    let mut root = Root::new(ctx, services.outlets);
    let mut poller = ConnectivityPoller::new(config.poll_interval);

    if let Some(effect) = root.init() {
        if apply_effect(effect, &mut poller)? {
            return Ok(());
        }
    }

    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal.draw(|frame| root.render(frame))?;
            needs_redraw = false;
        }

        let now = Instant::now();
        let timeout = poller
            .time_until_due(now)
            .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));

        let mut events = Vec::new();
        if let Some(first) = poll_event_timeout(timeout)? {
            events.push(first);
            drain_pending(&mut events)?;
        }
        if poller.take_due(Instant::now()) {
            events.push(TuiEvent::ConnectivityTick);
        }

        for event in events {
            needs_redraw = true;
            if !matches!(event, TuiEvent::ConnectivityTick) {
                debug!("Event: {:?}", event);
            }
            if let Some(effect) = root.handle_event(event) {
                if apply_effect(effect, &mut poller)? {
                    info!("Quit requested");
                    return Ok(());
                }
            }
        }
    }
}
