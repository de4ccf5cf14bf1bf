//! Multi-line draft editor widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Rows the editor may grow to before it scrolls internally.
const MAX_VISIBLE_ROWS: usize = 6;

/// Multi-line, auto-growing text input that owns the current draft.
///
/// Enter is decoded to [`Action::Submit`] upstream; the editor itself
/// only ever sees [`Action::NewLine`] for literal line breaks.
#[derive(Debug, Default)]
pub struct DraftEditor {
    /// Current draft text, may contain newlines
    content: String,
    /// Cursor position (character index, not byte index)
    cursor: usize,
    /// Vertical scroll offset (in wrapped rows)
    scroll_top: usize,
    /// Placeholder text
    placeholder: String,
}

impl DraftEditor {
    /// Create a new editor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Get the current draft
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True when the draft trims to nothing; blank drafts never submit.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Return the draft and clear it.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.scroll_top = 0;
        std::mem::take(&mut self.content)
    }

    /// Clear the draft.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll_top = 0;
    }

    /// Get the byte offset for the current cursor position
    fn cursor_byte_offset(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn insert_char(&mut self, c: char) {
        let byte_offset = self.cursor_byte_offset();
        self.content.insert(byte_offset, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor (may join two lines).
    fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.delete_at_cursor()
    }

    /// Delete the character under the cursor.
    fn delete_at_cursor(&mut self) -> bool {
        let byte_offset = self.cursor_byte_offset();
        if byte_offset >= self.content.len() {
            return false;
        }
        let next_boundary = self.content[byte_offset..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| byte_offset + i)
            .unwrap_or(self.content.len());
        self.content.drain(byte_offset..next_boundary);
        true
    }

    /// Char-index bounds of the logical line the cursor is on.
    fn line_bounds(&self) -> (usize, usize) {
        let chars: Vec<char> = self.content.chars().collect();
        let start = chars[..self.cursor.min(chars.len())]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = chars[self.cursor.min(chars.len())..]
            .iter()
            .position(|&c| c == '\n')
            .map(|i| self.cursor + i)
            .unwrap_or(chars.len());
        (start, end)
    }

    fn move_vertical(&mut self, up: bool) -> bool {
        let chars: Vec<char> = self.content.chars().collect();
        let (start, end) = self.line_bounds();
        let col = self.cursor - start;

        if up {
            if start == 0 {
                return false;
            }
            // Previous line ends at the '\n' just before this one.
            let prev_end = start - 1;
            let prev_start = chars[..prev_end]
                .iter()
                .rposition(|&c| c == '\n')
                .map(|i| i + 1)
                .unwrap_or(0);
            self.cursor = prev_start + col.min(prev_end - prev_start);
        } else {
            if end >= chars.len() {
                return false;
            }
            let next_start = end + 1;
            let next_end = chars[next_start..]
                .iter()
                .position(|&c| c == '\n')
                .map(|i| next_start + i)
                .unwrap_or(chars.len());
            self.cursor = next_start + col.min(next_end - next_start);
        }
        true
    }

    /// Handle an input action, returning true if the draft changed or
    /// the cursor moved.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        let char_count = self.content.chars().count();

        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::NewLine => {
                self.insert_char('\n');
                true
            }
            Action::Backspace => self.delete_backward(),
            Action::Delete => self.delete_at_cursor(),
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Up => self.move_vertical(true),
            Action::Down => self.move_vertical(false),
            Action::Home => {
                self.cursor = self.line_bounds().0;
                true
            }
            Action::End => {
                self.cursor = self.line_bounds().1;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::Paste(text) => {
                // Normalize CRLF, keep newlines: the draft is multi-line.
                for c in text.replace("\r\n", "\n").chars() {
                    if c != '\r' {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Wrap the draft into display rows and locate the cursor.
    /// Returns (rows, cursor_row, cursor_x).
    fn layout(&self, width: usize) -> (Vec<String>, usize, usize) {
        let width = width.max(1);
        let mut rows: Vec<String> = vec![];
        let mut row = String::new();
        let mut row_width = 0usize;
        let mut cursor_pos = None;

        for (i, c) in self.content.chars().enumerate() {
            if i == self.cursor {
                cursor_pos = Some((rows.len(), row_width));
            }
            if c == '\n' {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
                continue;
            }
            let w = c.width().unwrap_or(0);
            if row_width + w > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(c);
            row_width += w;
        }
        if cursor_pos.is_none() {
            cursor_pos = Some((rows.len(), row_width));
        }
        rows.push(row);

        let (cursor_row, cursor_x) = cursor_pos.unwrap_or((0, 0));
        (rows, cursor_row, cursor_x)
    }

    /// Number of wrapped rows at the given inner width.
    pub fn row_count(&self, inner_width: usize) -> usize {
        self.layout(inner_width).0.len()
    }

    /// Total widget height (content rows plus borders), auto-growing
    /// up to a bound.
    pub fn desired_height(&self, total_width: u16) -> u16 {
        let inner = total_width.saturating_sub(2).max(1) as usize;
        let rows = self.row_count(inner).clamp(1, MAX_VISIBLE_ROWS);
        rows as u16 + 2
    }

    /// Render the editor
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.accent_style());

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.content.is_empty() {
            let paragraph = Paragraph::new(self.placeholder.as_str()).style(theme.dim_style());
            paragraph.render(inner, buf);
            if let Some(cell) = buf.cell_mut((inner.x, inner.y)) {
                cell.set_style(Style::default().bg(theme.accent));
            }
            return;
        }

        let (rows, cursor_row, cursor_x) = self.layout(inner.width as usize);

        // Keep the cursor row in view.
        let visible = inner.height as usize;
        if cursor_row < self.scroll_top {
            self.scroll_top = cursor_row;
        } else if cursor_row >= self.scroll_top + visible {
            self.scroll_top = cursor_row + 1 - visible;
        }

        let lines: Vec<Line> = rows
            .iter()
            .skip(self.scroll_top)
            .take(visible)
            .map(|r| Line::from(r.clone()))
            .collect();
        let paragraph = Paragraph::new(lines).style(theme.base_style());
        paragraph.render(inner, buf);

        let x = inner.x + (cursor_x as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_row - self.scroll_top) as u16;
        if y < inner.y + inner.height {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(Style::default().bg(theme.accent));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut DraftEditor, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                editor.handle_action(&Action::NewLine);
            } else {
                editor.handle_action(&Action::Char(c));
            }
        }
    }

    #[test]
    fn test_typing_builds_draft() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "hello");
        assert_eq!(editor.content(), "hello");
    }

    #[test]
    fn test_newline_action_inserts_literal_newline() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "one");
        editor.handle_action(&Action::NewLine);
        type_str(&mut editor, "two");
        assert_eq!(editor.content(), "one\ntwo");
    }

    #[test]
    fn test_take_returns_and_clears() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "message");
        assert_eq!(editor.take(), "message");
        assert_eq!(editor.content(), "");
        assert!(editor.is_blank());
    }

    #[test]
    fn test_blank_detection() {
        let mut editor = DraftEditor::new();
        assert!(editor.is_blank());
        type_str(&mut editor, "   \n  ");
        assert!(editor.is_blank());
        type_str(&mut editor, "x");
        assert!(!editor.is_blank());
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "ab\ncd");
        // Cursor at end; move to start of second line, then backspace
        // over the newline.
        editor.handle_action(&Action::Home);
        editor.handle_action(&Action::Backspace);
        assert_eq!(editor.content(), "abcd");
    }

    #[test]
    fn test_clear_line_clears_whole_draft() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "one\ntwo");
        editor.handle_action(&Action::ClearLine);
        assert_eq!(editor.content(), "");
    }

    #[test]
    fn test_paste_keeps_newlines() {
        let mut editor = DraftEditor::new();
        editor.handle_action(&Action::Paste("a\r\nb\nc".into()));
        assert_eq!(editor.content(), "a\nb\nc");
    }

    #[test]
    fn test_vertical_movement_between_lines() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "long line\nhi");
        // Cursor at end of "hi" (col 2); up lands at col 2 of line 1.
        assert!(editor.handle_action(&Action::Up));
        editor.handle_action(&Action::Char('X'));
        assert_eq!(editor.content(), "loXng line\nhi");
    }

    #[test]
    fn test_rows_grow_with_wrapping() {
        let mut editor = DraftEditor::new();
        type_str(&mut editor, "abcdefghij");
        assert_eq!(editor.row_count(5), 2);
        assert_eq!(editor.row_count(20), 1);
    }

    #[test]
    fn test_desired_height_is_bounded() {
        let mut editor = DraftEditor::new();
        assert_eq!(editor.desired_height(80), 3);
        type_str(&mut editor, &"line\n".repeat(20));
        assert_eq!(editor.desired_height(80), MAX_VISIBLE_ROWS as u16 + 2);
    }
}
