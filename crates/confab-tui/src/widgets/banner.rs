//! Dismissible error banner widget

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// One-line banner shown while a dispatch failure is undismissed.
pub struct ErrorBanner<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self { message, theme }
    }
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let line = Line::from(vec![
            Span::styled(format!("⚠ {}", self.message), self.theme.error_style()),
            Span::styled("  (Esc to dismiss)", self.theme.dim_style()),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}
