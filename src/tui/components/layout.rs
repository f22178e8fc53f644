//! Shared chrome for every step: a title line, a rounded box for the body,
//! an optional status line and a help line.
//!
//! ```text
//! Step 2: Select Files          <- title
//! ╭──────────────────────────╮
//! │ body                     │
//! ╰──────────────────────────╯
//! Selected: 2 files             <- status (blank when empty)
//! [↑↓ Navigate] [Tab: Next]     <- help
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub const TITLE_STYLE: Style = Style::new().fg(Color::Magenta).add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new().fg(Color::White).bg(Color::Indexed(57));
pub const HELP_STYLE: Style = Style::new().fg(Color::DarkGray);

pub struct Chrome<'a> {
    pub title: &'a str,
    pub help: &'a str,
    pub status: &'a str,
}

fn split(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area)
}

fn body_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}

/// The area inside the body box for a screen of `area`.
///
/// Steps that size their own state (the editor) call this from their resize
/// handler so render never has to recompute layout.
pub fn body_inner(area: Rect) -> Rect {
    let [_, body, _, _] = split(area);
    body_block().inner(body)
}

impl Chrome<'_> {
    /// Draw the chrome and return the area left for the body.
    pub fn render(&self, frame: &mut Frame, area: Rect) -> Rect {
        let [title_area, body_area, status_area, help_area] = split(area);

        frame.render_widget(Paragraph::new(Span::styled(self.title, TITLE_STYLE)), title_area);

        let block = body_block();
        let inner = block.inner(body_area);
        frame.render_widget(block, body_area);

        if !self.status.is_empty() {
            frame.render_widget(Paragraph::new(self.status), status_area);
        }
        frame.render_widget(Paragraph::new(Span::styled(self.help, HELP_STYLE)), help_area);
        inner
    }
}

/// A selectable list line: `> ◯ label` for the cursor row, `  ◯ label` otherwise.
pub fn choice_line(label: &str, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(format!("> ◯ {label}"), SELECTED_STYLE))
    } else {
        Line::from(format!("  ◯ {label}"))
    }
}

/// Keep `cursor` inside a window of `height` rows starting at `offset`.
pub fn scroll_to_cursor(offset: usize, cursor: usize, height: usize) -> usize {
    if height == 0 || cursor < offset {
        cursor
    } else if cursor >= offset + height {
        cursor + 1 - height
    } else {
        offset
    }
}
