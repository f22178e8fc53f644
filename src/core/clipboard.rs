//! # Clipboard
//!
//! System clipboard access behind a trait so the review step can be tested
//! without a display server.

use std::sync::Mutex;

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[from] arboard::Error),
    #[error("clipboard lock poisoned")]
    Poisoned,
}

pub trait ClipboardWriter: Send + Sync {
    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard via arboard.
///
/// The handle is created on first use and then kept for the process
/// lifetime: on X11 the copied text is only served while it exists.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let mut guard = self.handle.lock().map_err(|_| ClipboardError::Poisoned)?;
        if guard.is_none() {
            *guard = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = guard.as_mut() {
            clipboard.set_text(text.to_string())?;
        }
        debug!("Wrote {} bytes to clipboard", text.len());
        Ok(())
    }
}
