//! Step 2 (file prompts): browse the scanned tree and check files.
//!
//! The list is the tree's flattened view. `Enter` expands or collapses the
//! directory under the cursor, `Space` checks or unchecks the file under it.
//! After a toggle the cursor stays on the toggled directory, so it always
//! points inside the recomputed list.

use log::debug;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::layout::{Chrome, SELECTED_STYLE, body_inner, scroll_to_cursor};
use super::{
    PromptSource, PromptTypeSelector, Selection, Step, TemplateSelector, apply_resize, move_cursor,
};
use crate::core::tree::{FileEntry, NodeId};
use crate::tui::component::{Effect, StepComponent, StepContext, Transition};
use crate::tui::event::TuiEvent;

pub struct FileSelector {
    ctx: StepContext,
    selection: Selection,
    visible: Vec<NodeId>,
    cursor: usize,
    offset: usize,
}

impl FileSelector {
    pub fn new(ctx: StepContext, selection: Selection) -> Self {
        let visible = selection.tree.flatten();
        Self {
            ctx,
            selection,
            visible,
            cursor: 0,
            offset: 0,
        }
    }

    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The entry under the cursor, if the list is not empty.
    pub fn current(&self) -> Option<&FileEntry> {
        self.visible
            .get(self.cursor)
            .and_then(|&id| self.selection.tree.get(id))
    }

    fn list_height(&self) -> usize {
        body_inner(Rect::new(0, 0, self.ctx.width, self.ctx.height)).height as usize
    }

    fn follow_cursor(&mut self) {
        self.offset = scroll_to_cursor(self.offset, self.cursor, self.list_height());
    }

    fn toggle_folder(&mut self) {
        let Some(&id) = self.visible.get(self.cursor) else {
            return;
        };
        if self.selection.tree.toggle_expanded(id) {
            self.visible = self.selection.tree.flatten();
            self.cursor = self.visible.iter().position(|&v| v == id).unwrap_or(0);
        }
    }

    fn toggle_file(&mut self) {
        let Some(&id) = self.visible.get(self.cursor) else {
            return;
        };
        match self.selection.tree.toggle_checked(id) {
            Some(true) => self.selection.selected.push(id),
            Some(false) => {
                if let Some(index) = self.selection.selected.iter().position(|&s| s == id) {
                    self.selection.selected.remove(index);
                }
            }
            None => {}
        }
    }
}

impl StepComponent for FileSelector {
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect> {
        if apply_resize(&mut self.ctx, event) || move_cursor(&mut self.cursor, self.visible.len(), event) {
            self.follow_cursor();
            return None;
        }
        match event {
            TuiEvent::Enter => {
                self.toggle_folder();
                self.follow_cursor();
            }
            TuiEvent::InputChar(' ') => self.toggle_file(),
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let status = format!("Selected: {} files", self.selection.selected.len());
        let body = Chrome {
            title: "Step 2: Select Files",
            help: "[↑↓ Navigate] [Enter: Toggle folder] [Space: Select file] [Tab: Next]",
            status: &status,
        }
        .render(frame, area);

        let lines: Vec<Line> = self
            .visible
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(body.height as usize)
            .map(|(i, &id)| {
                let label = self.selection.tree.label(id);
                if i == self.cursor {
                    Line::from(Span::styled(format!("> {label}"), SELECTED_STYLE))
                } else {
                    Line::from(format!("  {label}"))
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), body);
    }

    fn advance(self) -> Transition {
        if self.selection.selected.is_empty() {
            return (Step::FileSelect(self), None);
        }
        debug!("{} files selected", self.selection.selected.len());
        let source = PromptSource::Files(self.selection);
        (Step::TemplateSelect(TemplateSelector::new(self.ctx, source)), None)
    }

    fn retreat(self) -> Transition {
        (Step::PromptType(PromptTypeSelector::new(self.ctx)), None)
    }
}
