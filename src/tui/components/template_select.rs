//! Pick a template from the catalog for the prompt's kind.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use super::layout::{Chrome, choice_line};
use super::prompt_type::GIT_OPTION;
use super::{
    FileSelector, PromptEditor, PromptSource, PromptTypeSelector, Step, apply_resize, move_cursor,
};
use crate::core::templates::PromptKind;
use crate::tui::component::{Effect, StepComponent, StepContext, Transition};
use crate::tui::event::TuiEvent;

pub struct TemplateSelector {
    ctx: StepContext,
    source: PromptSource,
    names: Vec<String>,
    cursor: usize,
}

impl TemplateSelector {
    pub fn new(ctx: StepContext, source: PromptSource) -> Self {
        let names = source.kind().template_names();
        Self {
            ctx,
            source,
            names,
            cursor: 0,
        }
    }

    /// Same as [`new`](Self::new) with the cursor on `name` (or the first
    /// entry if the catalog has no such name).
    pub fn with_selected(ctx: StepContext, source: PromptSource, name: &str) -> Self {
        let mut selector = Self::new(ctx, source);
        selector.cursor = selector.names.iter().position(|n| n == name).unwrap_or(0);
        selector
    }

    pub fn kind(&self) -> PromptKind {
        self.source.kind()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn source(&self) -> &PromptSource {
        &self.source
    }
}

impl StepComponent for TemplateSelector {
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect> {
        if apply_resize(&mut self.ctx, event) || move_cursor(&mut self.cursor, self.names.len(), event) {
            return None;
        }
        match event {
            TuiEvent::Enter => Some(Effect::Advance),
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match self.kind() {
            PromptKind::Git => "Step 2: Choose Prompt Template",
            PromptKind::File => "Step 3: Choose Prompt Template",
        };
        let body = Chrome {
            title,
            help: "[↑↓ Navigate] [Tab: Next] [Esc: Back]",
            status: "",
        }
        .render(frame, area);

        let lines: Vec<Line> = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| choice_line(name, i == self.cursor))
            .collect();
        frame.render_widget(Paragraph::new(lines), body);
    }

    fn advance(self) -> Transition {
        let name = self.names.get(self.cursor).cloned().unwrap_or_default();
        let body = self.kind().template_body(&name);
        let editor = PromptEditor::new(self.ctx, self.source, name, body.to_string());
        let effect = editor.init();
        (Step::Editor(editor), effect)
    }

    fn retreat(self) -> Transition {
        let previous = match self.source {
            PromptSource::Files(selection) => Step::FileSelect(FileSelector::new(self.ctx, selection)),
            PromptSource::Git => {
                Step::PromptType(PromptTypeSelector::with_cursor(self.ctx, GIT_OPTION))
            }
        };
        (previous, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::FileTree;
    use crate::test_support::{render_to_string, temp_tree, test_ctx};
    use crate::tui::components::{Selection, StepKind};

    fn file_source() -> PromptSource {
        let mut tree = FileTree::new(".");
        let a = tree.add_child(FileTree::ROOT, "a.txt", false);
        tree.toggle_checked(a);
        PromptSource::Files(Selection {
            tree,
            selected: vec![a],
        })
    }

    #[test]
    fn test_names_follow_kind() {
        let dir = temp_tree(&[]);
        let git = TemplateSelector::new(test_ctx(dir.path()), PromptSource::Git);
        assert_eq!(git.names().len(), 4);
        let file = TemplateSelector::new(test_ctx(dir.path()), file_source());
        assert_eq!(file.names(), ["Code Review", "Documentation", "Custom..."]);
    }

    #[test]
    fn test_advance_loads_template_body() {
        let dir = temp_tree(&[]);
        let mut step = TemplateSelector::new(test_ctx(dir.path()), PromptSource::Git);
        step.handle_event(&TuiEvent::CursorDown);
        step.handle_event(&TuiEvent::CursorDown);

        let (next, effect) = step.advance();
        assert_eq!(effect, Some(Effect::SteadyCursor));
        let Step::Editor(editor) = next else {
            panic!("expected editor");
        };
        assert_eq!(editor.template_name(), "Change Summary");
        assert_eq!(
            editor.text(),
            "Summarize the changes in this commit:\n\n$(git log --oneline -1)\n$(git diff HEAD~1)"
        );
    }

    #[test]
    fn test_editor_round_trip_preserves_names_and_kind() {
        let dir = temp_tree(&[]);
        let mut step = TemplateSelector::new(test_ctx(dir.path()), file_source());
        step.handle_event(&TuiEvent::CursorDown);
        let names = step.names().to_vec();

        let (editor, _) = step.advance();
        let (back, _) = editor.retreat();
        let Step::TemplateSelect(back) = back else {
            panic!("expected template selector");
        };
        assert_eq!(back.names(), names.as_slice());
        assert_eq!(back.kind(), PromptKind::File);
        assert_eq!(back.cursor(), 1);
    }

    #[test]
    fn test_retreat_file_kind_keeps_checked_files() {
        let dir = temp_tree(&[]);
        let step = TemplateSelector::new(test_ctx(dir.path()), file_source());
        let (back, _) = step.retreat();
        let Step::FileSelect(files) = back else {
            panic!("expected file selector");
        };
        assert_eq!(files.selection().selected.len(), 1);
        assert!(files.current().unwrap().checked);
    }

    #[test]
    fn test_retreat_git_kind_returns_to_prompt_type() {
        let dir = temp_tree(&[]);
        let step = TemplateSelector::new(test_ctx(dir.path()), PromptSource::Git);
        let (back, _) = step.retreat();
        assert_eq!(back.kind(), StepKind::PromptType);
        let Step::PromptType(prompt_type) = back else { unreachable!() };
        assert_eq!(prompt_type.cursor(), GIT_OPTION);
    }

    #[test]
    fn test_unknown_name_selects_first() {
        let dir = temp_tree(&[]);
        let step = TemplateSelector::with_selected(test_ctx(dir.path()), PromptSource::Git, "Nope");
        assert_eq!(step.cursor(), 0);
    }

    #[test]
    fn test_render_title_depends_on_kind() {
        let dir = temp_tree(&[]);
        let git = TemplateSelector::new(test_ctx(dir.path()), PromptSource::Git);
        assert!(render_to_string(&git, 60, 10).contains("Step 2: Choose Prompt Template"));
        let file = TemplateSelector::new(test_ctx(dir.path()), file_source());
        let screen = render_to_string(&file, 60, 10);
        assert!(screen.contains("Step 3: Choose Prompt Template"));
        assert!(screen.contains("> ◯ Code Review"));
    }
}
