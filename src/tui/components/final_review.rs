//! # FinalReview Component
//!
//! Last step: shows what will be delivered and delivers it.
//!
//! The prompt is expanded only at delivery time. File prompts get the
//! selected files' contents in place of `$(files)`; git prompts get their
//! `$(git ...)` substitutions run in the workspace root.
//!
//! Delivery targets come in through [`Outlets`], which the root injects
//! when this step is installed. Every failure ends up in the status line.

use std::sync::Arc;

use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::{Paragraph, Wrap};

use super::layout::Chrome;
use super::{PromptEditor, PromptSource, Step, apply_resize};
use crate::core::clipboard::ClipboardWriter;
use crate::core::expand::{DEFAULT_FILE_TEMPLATE, expand_files};
use crate::core::relay::{ConsumerCount, OutboundSink, PromptMessage};
use crate::core::templates::PromptKind;
use crate::tui::component::{Effect, StepComponent, StepContext, Transition};
use crate::tui::event::TuiEvent;

/// Characters of a git prompt shown before it is cut off.
const PREVIEW_CHARS: usize = 500;

/// Shared delivery context, owned by the root and handed to each review step.
#[derive(Clone, Default)]
pub struct Outlets {
    pub sink: Option<OutboundSink>,
    pub clipboard: Option<Arc<dyn ClipboardWriter>>,
    pub consumers: Option<Arc<dyn ConsumerCount>>,
}

impl Outlets {
    /// Whether at least one extension is attached right now.
    pub fn extension_connected(&self) -> bool {
        self.consumers
            .as_ref()
            .is_some_and(|consumers| consumers.connected() > 0)
    }
}

pub struct FinalReview {
    ctx: StepContext,
    source: PromptSource,
    template_name: String,
    final_text: String,
    extension_connected: bool,
    outlets: Outlets,
    message: String,
}

impl FinalReview {
    pub fn new(ctx: StepContext, source: PromptSource, template_name: String, final_text: String) -> Self {
        Self {
            ctx,
            source,
            template_name,
            final_text,
            extension_connected: false,
            outlets: Outlets::default(),
            message: String::new(),
        }
    }

    /// Inject the shared delivery context.
    pub fn attach(&mut self, extension_connected: bool, outlets: Outlets) {
        self.extension_connected = extension_connected;
        self.outlets = outlets;
    }

    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn kind(&self) -> PromptKind {
        self.source.kind()
    }

    pub fn extension_connected(&self) -> bool {
        self.extension_connected
    }

    /// The last delivery outcome, empty until something was attempted.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The prompt with every substitution filled in.
    pub fn expanded_prompt(&self) -> String {
        match &self.source {
            PromptSource::Files(selection) => expand_files(&self.final_text, selection.paths()),
            PromptSource::Git => self.ctx.workspace.expand_commands(&self.final_text),
        }
    }

    fn copy(&mut self) {
        let Some(clipboard) = self.outlets.clipboard.clone() else {
            self.message = "Clipboard error: no clipboard available".to_string();
            return;
        };
        let prompt = self.expanded_prompt();
        self.message = match clipboard.write(&prompt) {
            Ok(()) => {
                info!("Copied {} bytes to clipboard", prompt.len());
                "Copied to clipboard!".to_string()
            }
            Err(e) => {
                warn!("Clipboard write failed: {}", e);
                format!("Clipboard error: {e}")
            }
        };
    }

    fn send(&mut self) {
        let sink = match (&self.outlets.sink, self.extension_connected) {
            (Some(sink), true) => sink.clone(),
            _ => {
                self.message = "Extension not connected".to_string();
                return;
            }
        };

        let prompt = self.expanded_prompt();
        let encoded = match PromptMessage::new(prompt.as_str()).encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode prompt: {}", e);
                self.message = format!("Error encoding prompt: {e}");
                return;
            }
        };

        self.message = match sink.try_deliver(encoded) {
            Ok(()) => {
                info!("Queued {} byte prompt for the extension", prompt.len());
                "Sent to extension!".to_string()
            }
            Err(e) => {
                warn!("Prompt not delivered: {}", e);
                format!("Not delivered: {e}")
            }
        };
    }

    fn body_text(&self) -> String {
        match &self.source {
            PromptSource::Files(selection) => {
                let template = if self.final_text.is_empty() {
                    DEFAULT_FILE_TEMPLATE
                } else {
                    &self.final_text
                };
                let mut files = String::from("Selected files:\n");
                for path in selection.paths() {
                    files.push_str(&format!("- {}\n", path.display()));
                }
                format!("Template: {}\n\n{}\n\n{}", self.template_name, template, files)
            }
            PromptSource::Git => {
                let preview = match self.final_text.char_indices().nth(PREVIEW_CHARS) {
                    Some((cut, _)) => format!("{}...", &self.final_text[..cut]),
                    None => self.final_text.clone(),
                };
                format!("Ready to copy:\n\n{preview}")
            }
        }
    }
}

impl StepComponent for FinalReview {
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect> {
        if apply_resize(&mut self.ctx, event) {
            return None;
        }
        match event {
            TuiEvent::InputChar('c' | 'C') => self.copy(),
            TuiEvent::InputChar('e' | 'E') => self.send(),
            TuiEvent::Connectivity(connected) => self.extension_connected = *connected,
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match self.kind() {
            PromptKind::File => "Step 5: Copy Prompt",
            PromptKind::Git => "Step 4: Copy Prompt",
        };
        let help = if self.extension_connected {
            "[C: Copy with Content] [Esc: Back] [E: Send to Extension]"
        } else {
            "[C: Copy with Content] [Esc: Back]"
        };
        let indicator = if self.extension_connected {
            "● extension"
        } else {
            "○ extension"
        };
        let status = if self.message.is_empty() {
            indicator.to_string()
        } else {
            format!("{indicator}  {}", self.message)
        };

        let body = Chrome {
            title,
            help,
            status: &status,
        }
        .render(frame, area);
        frame.render_widget(
            Paragraph::new(self.body_text()).wrap(Wrap { trim: false }),
            body,
        );
    }

    fn advance(self) -> Transition {
        (Step::Review(self), None)
    }

    fn retreat(self) -> Transition {
        let editor = PromptEditor::new(self.ctx, self.source, self.template_name, self.final_text);
        let effect = editor.init();
        (Step::Editor(editor), effect)
    }
}
