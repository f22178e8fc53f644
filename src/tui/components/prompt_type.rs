//! Step 1: choose between a file based and a git based prompt.

use log::debug;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use super::layout::{Chrome, choice_line};
use super::{FileSelector, PromptSource, Selection, Step, TemplateSelector, apply_resize, move_cursor};
use crate::tui::component::{Effect, StepComponent, StepContext, Transition};
use crate::tui::event::TuiEvent;

pub const OPTIONS: [&str; 2] = ["File based Prompt", "Git based Prompt"];

const FILE_OPTION: usize = 0;
pub const GIT_OPTION: usize = 1;

pub struct PromptTypeSelector {
    ctx: StepContext,
    cursor: usize,
}

impl PromptTypeSelector {
    pub fn new(ctx: StepContext) -> Self {
        Self::with_cursor(ctx, FILE_OPTION)
    }

    pub fn with_cursor(ctx: StepContext, cursor: usize) -> Self {
        Self {
            ctx,
            cursor: cursor.min(OPTIONS.len() - 1),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl StepComponent for PromptTypeSelector {
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect> {
        if apply_resize(&mut self.ctx, event) || move_cursor(&mut self.cursor, OPTIONS.len(), event) {
            return None;
        }
        match event {
            TuiEvent::Enter => Some(Effect::Advance),
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let body = Chrome {
            title: "Step 1: Choose Prompt Type",
            help: "[↑↓ Navigate] [Tab: Next] [Ctrl+C: Quit]",
            status: "",
        }
        .render(frame, area);

        let lines: Vec<Line> = OPTIONS
            .iter()
            .enumerate()
            .map(|(i, option)| choice_line(option, i == self.cursor))
            .collect();
        frame.render_widget(Paragraph::new(lines), body);
    }

    fn advance(self) -> Transition {
        if self.cursor == FILE_OPTION {
            let tree = self.ctx.workspace.scan();
            debug!("Starting file prompt in {}", self.ctx.workspace.root().display());
            let selection = Selection {
                tree,
                selected: Vec::new(),
            };
            (Step::FileSelect(FileSelector::new(self.ctx, selection)), None)
        } else {
            debug!("Starting git prompt");
            (
                Step::TemplateSelect(TemplateSelector::new(self.ctx, PromptSource::Git)),
                None,
            )
        }
    }

    fn retreat(self) -> Transition {
        (Step::PromptType(self), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::PromptKind;
    use crate::test_support::{render_to_string, temp_tree, test_ctx};
    use crate::tui::components::StepKind;

    #[test]
    fn test_cursor_clamped_to_two_options() {
        let dir = temp_tree(&[]);
        let mut step = PromptTypeSelector::new(test_ctx(dir.path()));
        for _ in 0..5 {
            step.handle_event(&TuiEvent::CursorDown);
        }
        assert_eq!(step.cursor(), GIT_OPTION);
        step.handle_event(&TuiEvent::InputChar('k'));
        assert_eq!(step.cursor(), FILE_OPTION);
    }

    #[test]
    fn test_enter_requests_advance() {
        let dir = temp_tree(&[]);
        let mut step = PromptTypeSelector::new(test_ctx(dir.path()));
        assert_eq!(step.handle_event(&TuiEvent::Enter), Some(Effect::Advance));
        assert_eq!(step.handle_event(&TuiEvent::InputChar('x')), None);
    }

    #[test]
    fn test_advance_file_scans_workspace() {
        let dir = temp_tree(&["a.txt", "src/lib.rs"]);
        let (next, effect) = PromptTypeSelector::new(test_ctx(dir.path())).advance();
        assert!(effect.is_none());
        let Step::FileSelect(selector) = next else {
            panic!("expected file selector");
        };
        assert_eq!(selector.visible().len(), 2);
        assert!(selector.selection().selected.is_empty());
    }

    #[test]
    fn test_advance_git_skips_file_step() {
        let dir = temp_tree(&[]);
        let (next, _) = PromptTypeSelector::with_cursor(test_ctx(dir.path()), GIT_OPTION).advance();
        let Step::TemplateSelect(selector) = next else {
            panic!("expected template selector");
        };
        assert_eq!(selector.kind(), PromptKind::Git);
    }

    #[test]
    fn test_retreat_is_noop() {
        let dir = temp_tree(&[]);
        let (prev, _) = PromptTypeSelector::with_cursor(test_ctx(dir.path()), GIT_OPTION).retreat();
        assert_eq!(prev.kind(), StepKind::PromptType);
        let Step::PromptType(step) = prev else { unreachable!() };
        assert_eq!(step.cursor(), GIT_OPTION);
    }

    #[test]
    fn test_render_marks_cursor() {
        let dir = temp_tree(&[]);
        let step = PromptTypeSelector::with_cursor(test_ctx(dir.path()), GIT_OPTION);
        let screen = render_to_string(&step, 50, 10);
        assert!(screen.contains("Step 1: Choose Prompt Type"));
        assert!(screen.contains("  ◯ File based Prompt"));
        assert!(screen.contains("> ◯ Git based Prompt"));
    }
}
