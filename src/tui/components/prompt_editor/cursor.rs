//! Cursor position tracking and navigation for the PromptEditor.
//!
//! `CursorState` owns the cursor byte offset and the scroll offset. All
//! navigation methods take the buffer and the viewport explicitly; the text
//! itself is owned by `PromptEditor`.

use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::text_wrap::{Row, wrap_rows};

/// Cursor and scroll state, separated from the text buffer.
pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// First wrapped row shown in the viewport
    pub scroll_offset: u16,
}

/// Index of the row holding byte offset `pos`.
fn row_of(rows: &[Row], pos: usize) -> usize {
    rows.iter().rposition(|row| row.start <= pos).unwrap_or(0)
}

impl CursorState {
    pub fn new(pos: usize) -> Self {
        Self {
            pos,
            scroll_offset: 0,
        }
    }

    /// Move cursor one wrapped row up (`direction < 0`) or down, keeping the
    /// display column where the target row is long enough.
    ///
    /// Returns `true` if cursor moved, `false` if already at boundary.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, width: u16) -> bool {
        let rows = wrap_rows(buffer, width);
        let current = row_of(&rows, self.pos);

        let target = if direction < 0 {
            if current == 0 {
                return false;
            }
            current - 1
        } else {
            if current + 1 >= rows.len() {
                return false;
            }
            current + 1
        };

        let row = rows[current];
        let column = buffer[row.start..self.pos.min(row.end).max(row.start)].width();

        let target_row = rows[target];
        let mut pos = target_row.start;
        let mut used = 0;
        for c in buffer[target_row.start..target_row.end].chars() {
            let w = c.width().unwrap_or(0);
            if used + w > column {
                break;
            }
            used += w;
            pos += c.len_utf8();
        }
        self.pos = pos;
        true
    }

    /// Calculate which wrapped row (0-based) the cursor is on.
    pub fn calculate_line(&self, buffer: &str, width: u16) -> u16 {
        row_of(&wrap_rows(buffer, width), self.pos) as u16
    }

    /// Update scroll offset to keep cursor visible within a viewport of
    /// `height` rows.
    pub fn update_scroll_offset(&mut self, buffer: &str, width: u16, height: u16) {
        let total_rows = wrap_rows(buffer, width).len() as u16;

        if height == 0 || total_rows <= height {
            self.scroll_offset = 0;
            return;
        }

        let cursor_line = self.calculate_line(buffer, width);

        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + height {
            self.scroll_offset = cursor_line.saturating_sub(height - 1);
        }
        self.scroll_offset = self.scroll_offset.min(total_rows - height);
    }

    /// Calculate screen position for cursor inside `area`, the viewport the
    /// text is drawn into. Returns (column, row) in screen coordinates.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let rows = wrap_rows(buffer, area.width);
        let index = row_of(&rows, self.pos);
        let row = rows[index];

        let column = buffer[row.start..self.pos.max(row.start)].width() as u16;
        let column = column.min(area.width.saturating_sub(1));
        let visible_row = (index as u16).saturating_sub(self.scroll_offset);

        (area.x + column, area.y + visible_row)
    }
}
