//! # PromptEditor Component
//!
//! Free-form editing of the chosen template before it is delivered.
//!
//! ## Responsibilities
//!
//! - Capture text input, paste and newlines
//! - Handle editing (backspace, delete, cursor movement)
//! - Keep the cursor row inside the viewport
//!
//! ## Layout
//!
//! The viewport is the inside of the shared body box. It is recomputed when
//! the terminal is resized, never during render, so render only reads state.
//! Cursor position and scroll state are encapsulated in `CursorState`.

mod cursor;
mod text_wrap;

use log::debug;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use super::layout::{Chrome, HELP_STYLE, body_inner};
use super::{FinalReview, PromptSource, Step, TemplateSelector, apply_resize};
use crate::core::templates::PromptKind;
use crate::tui::component::{Effect, StepComponent, StepContext, Transition};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{next_char_boundary, prev_char_boundary, wrap_rows};

/// Below this size the editor refuses to draw.
const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 10;

const PLACEHOLDER: &str = "Edit your prompt here...";

pub struct PromptEditor {
    ctx: StepContext,
    source: PromptSource,
    template_name: String,
    /// Text buffer
    buffer: String,
    /// Cursor and scroll tracking
    cursor: CursorState,
    /// Where the text goes, relative to the screen origin
    view: Rect,
}

impl PromptEditor {
    /// Create an editor holding `text`, with the cursor at its end.
    pub fn new(ctx: StepContext, source: PromptSource, template_name: String, text: String) -> Self {
        let mut editor = Self {
            ctx,
            source,
            template_name,
            cursor: CursorState::new(text.len()),
            buffer: text,
            view: Rect::default(),
        };
        editor.relayout();
        editor
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn kind(&self) -> PromptKind {
        self.source.kind()
    }

    pub fn too_small(&self) -> bool {
        self.ctx.width < MIN_WIDTH || self.ctx.height < MIN_HEIGHT
    }

    fn relayout(&mut self) {
        self.view = body_inner(Rect::new(0, 0, self.ctx.width, self.ctx.height));
        self.follow_cursor();
    }

    fn follow_cursor(&mut self) {
        self.cursor
            .update_scroll_offset(&self.buffer, self.view.width, self.view.height);
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor.pos, text);
        self.cursor.pos += text.len();
    }

    fn line_start(&self) -> usize {
        self.buffer[..self.cursor.pos]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn line_end(&self) -> usize {
        self.buffer[self.cursor.pos..]
            .find('\n')
            .map(|i| self.cursor.pos + i)
            .unwrap_or(self.buffer.len())
    }
}

impl StepComponent for PromptEditor {
    fn init(&self) -> Option<Effect> {
        Some(Effect::SteadyCursor)
    }

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Effect> {
        if apply_resize(&mut self.ctx, event) {
            self.relayout();
            return None;
        }

        match event {
            TuiEvent::InputChar(c) => {
                let mut utf8 = [0u8; 4];
                self.insert(c.encode_utf8(&mut utf8));
            }
            TuiEvent::Enter => self.insert("\n"),
            TuiEvent::Paste(text) => self.insert(text),
            TuiEvent::Backspace => {
                if self.cursor.pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(prev..self.cursor.pos);
                    self.cursor.pos = prev;
                }
            }
            TuiEvent::Delete => {
                if self.cursor.pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(self.cursor.pos..next);
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor.pos > 0 {
                    self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor.pos < self.buffer.len() {
                    self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                }
            }
            TuiEvent::Home => self.cursor.pos = self.line_start(),
            TuiEvent::End => self.cursor.pos = self.line_end(),
            TuiEvent::CursorUp => {
                self.cursor.move_vertically(&self.buffer, -1, self.view.width);
            }
            TuiEvent::CursorDown => {
                self.cursor.move_vertically(&self.buffer, 1, self.view.width);
            }
            _ => return None,
        }
        self.follow_cursor();
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.too_small() {
            frame.render_widget(Paragraph::new("Your terminal is too small."), area);
            return;
        }

        let title = match self.kind() {
            PromptKind::Git => "Step 3: Review & Edit",
            PromptKind::File => "Step 4: Review & Edit",
        };
        let body = Chrome {
            title,
            help: "[↑↓←→ Type freely] [Tab: Next] [Esc: Back]",
            status: "",
        }
        .render(frame, area);
        let viewport = Rect {
            width: self.view.width.min(body.width),
            height: self.view.height.min(body.height),
            ..body
        };

        if self.buffer.is_empty() {
            frame.render_widget(Paragraph::new(PLACEHOLDER).style(HELP_STYLE), viewport);
        } else {
            let lines: Vec<Line> = wrap_rows(&self.buffer, self.view.width)
                .into_iter()
                .skip(self.cursor.scroll_offset as usize)
                .take(viewport.height as usize)
                .map(|row| Line::from(&self.buffer[row.start..row.end]))
                .collect();
            frame.render_widget(
                Paragraph::new(lines).style(Style::default().fg(Color::Green)),
                viewport,
            );
        }

        let (x, y) = self.cursor.screen_pos(&self.buffer, viewport);
        frame.set_cursor_position((x, y));
    }

    fn advance(self) -> Transition {
        debug!(
            "Editing done ({} template, {} bytes)",
            self.template_name,
            self.buffer.len()
        );
        let review = FinalReview::new(self.ctx, self.source, self.template_name, self.buffer);
        (Step::Review(review), None)
    }

    fn retreat(self) -> Transition {
        let selector = TemplateSelector::with_selected(self.ctx, self.source, &self.template_name);
        (Step::TemplateSelect(selector), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{render_to_string, temp_tree, test_ctx};

    fn editor(text: &str) -> (tempfile::TempDir, PromptEditor) {
        let dir = temp_tree(&[]);
        let editor = PromptEditor::new(
            test_ctx(dir.path()),
            PromptSource::Git,
            "Custom...".to_string(),
            text.to_string(),
        );
        (dir, editor)
    }

    #[test]
    fn test_typing_appends_at_cursor() {
        let (_dir, mut editor) = editor("ab");
        editor.handle_event(&TuiEvent::InputChar('c'));
        editor.handle_event(&TuiEvent::Enter);
        editor.handle_event(&TuiEvent::Paste("dé".into()));
        assert_eq!(editor.text(), "abc\ndé");

        editor.handle_event(&TuiEvent::Backspace);
        assert_eq!(editor.text(), "abc\nd");
    }

    #[test]
    fn test_home_end_and_delete() {
        let (_dir, mut editor) = editor("one\ntwo");
        editor.handle_event(&TuiEvent::Home);
        editor.handle_event(&TuiEvent::Delete);
        assert_eq!(editor.text(), "one\nwo");

        editor.handle_event(&TuiEvent::CursorUp);
        editor.handle_event(&TuiEvent::End);
        editor.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(editor.text(), "one!\nwo");
    }

    #[test]
    fn test_left_right_stop_at_edges() {
        let (_dir, mut editor) = editor("x");
        editor.handle_event(&TuiEvent::CursorRight);
        editor.handle_event(&TuiEvent::CursorLeft);
        editor.handle_event(&TuiEvent::CursorLeft);
        editor.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(editor.text(), ">x");
    }

    #[test]
    fn test_reserved_events_do_not_edit() {
        let (_dir, mut editor) = editor("keep");
        assert_eq!(editor.handle_event(&TuiEvent::Connectivity(true)), None);
        assert_eq!(editor.text(), "keep");
    }

    #[test]
    fn test_init_requests_cursor() {
        let (_dir, editor) = editor("");
        assert_eq!(editor.init(), Some(Effect::SteadyCursor));
    }

    #[test]
    fn test_resize_recomputes_view_not_render() {
        let (_dir, mut editor) = editor("");
        editor.handle_event(&TuiEvent::Resize { width: 30, height: 12 });
        assert_eq!(editor.view, body_inner(Rect::new(0, 0, 30, 12)));
    }

    #[test]
    fn test_advance_carries_edited_text() {
        let (_dir, mut editor) = editor("draft");
        editor.handle_event(&TuiEvent::InputChar('!'));
        let (next, _) = editor.advance();
        let Step::Review(review) = next else {
            panic!("expected review");
        };
        assert_eq!(review.final_text(), "draft!");
        assert_eq!(review.template_name(), "Custom...");
    }

    #[test]
    fn test_retreat_selects_current_template() {
        let (_dir, editor) = editor("anything");
        let (prev, _) = editor.retreat();
        let Step::TemplateSelect(selector) = prev else {
            panic!("expected template selector");
        };
        assert_eq!(selector.cursor(), 3);
    }

    #[test]
    fn test_render_too_small() {
        let (_dir, mut editor) = editor("text");
        editor.handle_event(&TuiEvent::Resize { width: 15, height: 8 });
        let screen = render_to_string(&editor, 15, 8);
        assert!(screen.contains("Your terminal"));
        assert!(!screen.contains("Review & Edit"));
    }

    #[test]
    fn test_render_shows_text_and_title() {
        let (_dir, editor) = editor("first line\nsecond line");
        let screen = render_to_string(&editor, 80, 24);
        assert!(screen.contains("Step 3: Review & Edit"));
        assert!(screen.contains("first line"));
        assert!(screen.contains("second line"));
    }

    #[test]
    fn test_render_placeholder_when_empty() {
        let (_dir, editor) = editor("");
        assert!(render_to_string(&editor, 80, 24).contains(PLACEHOLDER));
    }
}
