//! # Wizard Steps
//!
//! One component per screen. The fixed order is:
//!
//! ```text
//! PromptType ─┬─ file ─▶ FileSelect ─▶ TemplateSelect(file) ─┐
//!             └─ git ──────────────────▶ TemplateSelect(git) ─┴─▶ Editor ─▶ Review
//! ```
//!
//! `Step` is the tagged union the root holds; it forwards the
//! `StepComponent` contract to whichever variant is active.

pub mod file_select;
pub mod final_review;
pub mod layout;
pub mod prompt_editor;
pub mod prompt_type;
pub mod template_select;

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::templates::PromptKind;
use crate::core::tree::{FileTree, NodeId};
use crate::tui::component::{Effect, StepComponent, StepContext, Transition};
use crate::tui::event::TuiEvent;

pub use file_select::FileSelector;
pub use final_review::{FinalReview, Outlets};
pub use prompt_editor::PromptEditor;
pub use prompt_type::PromptTypeSelector;
pub use template_select::TemplateSelector;

/// Files checked in the file step, kept together with the tree they live in
/// so the file step can be rebuilt exactly when navigating back.
#[derive(Debug, Clone)]
pub struct Selection {
    pub tree: FileTree,
    pub selected: Vec<NodeId>,
}

impl Selection {
    pub fn paths(&self) -> Vec<&Path> {
        self.selected
            .iter()
            .filter_map(|&id| self.tree.get(id))
            .map(|entry| entry.path.as_path())
            .collect()
    }
}

/// What a prompt is built from, carried forward through every step.
#[derive(Debug, Clone)]
pub enum PromptSource {
    Files(Selection),
    Git,
}

impl PromptSource {
    pub fn kind(&self) -> PromptKind {
        match self {
            PromptSource::Files(_) => PromptKind::File,
            PromptSource::Git => PromptKind::Git,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    PromptType,
    FileSelect,
    TemplateSelect,
    Editor,
    Review,
}

pub enum Step {
    PromptType(PromptTypeSelector),
    FileSelect(FileSelector),
    TemplateSelect(TemplateSelector),
    Editor(PromptEditor),
    Review(FinalReview),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::PromptType(_) => StepKind::PromptType,
            Step::FileSelect(_) => StepKind::FileSelect,
            Step::TemplateSelect(_) => StepKind::TemplateSelect,
            Step::Editor(_) => StepKind::Editor,
            Step::Review(_) => StepKind::Review,
        }
    }

    /// The first step of a fresh wizard.
    pub fn first(ctx: StepContext) -> Self {
        Step::PromptType(PromptTypeSelector::new(ctx))
    }
}

impl StepComponent for Step {
    fn init(&self) -> Option<Effect> {
        match self {
            Step::PromptType(s) => s.init(),
            Step::FileSelect(s) => s.init(),
            Step::TemplateSelect(s) => s.init(),
            Step::Editor(s) => s.init(),
            Step::Review(s) => s.init(),
        }
    }

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect> {
        match self {
            Step::PromptType(s) => s.handle_event(event),
            Step::FileSelect(s) => s.handle_event(event),
            Step::TemplateSelect(s) => s.handle_event(event),
            Step::Editor(s) => s.handle_event(event),
            Step::Review(s) => s.handle_event(event),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Step::PromptType(s) => s.render(frame, area),
            Step::FileSelect(s) => s.render(frame, area),
            Step::TemplateSelect(s) => s.render(frame, area),
            Step::Editor(s) => s.render(frame, area),
            Step::Review(s) => s.render(frame, area),
        }
    }

    fn advance(self) -> Transition {
        match self {
            Step::PromptType(s) => s.advance(),
            Step::FileSelect(s) => s.advance(),
            Step::TemplateSelect(s) => s.advance(),
            Step::Editor(s) => s.advance(),
            Step::Review(s) => s.advance(),
        }
    }

    fn retreat(self) -> Transition {
        match self {
            Step::PromptType(s) => s.retreat(),
            Step::FileSelect(s) => s.retreat(),
            Step::TemplateSelect(s) => s.retreat(),
            Step::Editor(s) => s.retreat(),
            Step::Review(s) => s.retreat(),
        }
    }
}

/// Cursor movement shared by the list steps: `↑`/`k` and `↓`/`j`,
/// clamped to `[0, len - 1]`. Returns true if the event was a move.
pub(crate) fn move_cursor(cursor: &mut usize, len: usize, event: &TuiEvent) -> bool {
    match event {
        TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
            *cursor = cursor.saturating_sub(1);
            true
        }
        TuiEvent::CursorDown | TuiEvent::InputChar('j') => {
            if len > 0 {
                *cursor = (*cursor + 1).min(len - 1);
            }
            true
        }
        _ => false,
    }
}

/// Record a resize in `ctx`. Returns true if the event was a resize.
pub(crate) fn apply_resize(ctx: &mut StepContext, event: &TuiEvent) -> bool {
    if let TuiEvent::Resize { width, height } = *event {
        ctx.width = width;
        ctx.height = height;
        true
    } else {
        false
    }
}
