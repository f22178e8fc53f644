//! Pure text wrapping helpers for the PromptEditor.
//!
//! Wrapping is done with textwrap, but rows are reported as byte ranges into
//! the source buffer so cursor math never has to re-measure wrapped copies.

/// One wrapped row: `buffer[start..end]` is the text shown on it.
///
/// Whitespace textwrap drops at a soft break is not part of any row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
}

/// Build textwrap options for the editor's inner width.
pub(super) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Wrap `text` into rows no wider than `width`.
///
/// Every logical line yields at least one row, so a trailing newline or an
/// empty line is always a row of its own. With zero width every logical line
/// is a single row.
pub(super) fn wrap_rows(text: &str, width: u16) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let before = rows.len();
        if width > 0 && !line.is_empty() {
            let mut search = 0;
            for piece in textwrap::wrap(line, wrap_options(width)) {
                let offset = line[search..]
                    .find(piece.as_ref())
                    .map(|i| search + i)
                    .unwrap_or(search);
                rows.push(Row {
                    start: line_start + offset,
                    end: line_start + offset + piece.len(),
                });
                search = offset + piece.len();
            }
        }
        if rows.len() == before {
            rows.push(Row {
                start: line_start,
                end: line_start + line.len(),
            });
        }
        line_start += line.len() + 1;
    }

    rows
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
