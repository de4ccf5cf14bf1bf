//! Transcript widget for displaying the exchanged messages

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

/// Which side of the exchange a transcript entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// View model for one rendered message.
///
/// Built by the caller from store state; the widget never reaches into
/// the session itself.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
    /// Locale-formatted time of day, e.g. "14:05"
    pub time_label: String,
    /// Render in the error style (synthetic failure replies)
    pub is_error: bool,
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>, time_label: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            time_label: time_label.into(),
            is_error: false,
        }
    }

    pub fn assistant(content: impl Into<String>, time_label: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            time_label: time_label.into(),
            is_error: false,
        }
    }

    pub fn with_error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }
}

/// Widget for displaying the transcript
pub struct TranscriptView<'a> {
    entries: &'a [TranscriptEntry],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(entries: &'a [TranscriptEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset (in rendered lines)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn render_entry(&self, entry: &TranscriptEntry, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let (label, label_style, prefix) = match entry.speaker {
            Speaker::User => ("You", self.theme.accent_bold(), "▶ "),
            Speaker::Assistant => {
                if entry.is_error {
                    (
                        "AI Assistant",
                        self.theme.error_style().add_modifier(Modifier::BOLD),
                        "◀ ",
                    )
                } else {
                    (
                        "AI Assistant",
                        self.theme.success_style().add_modifier(Modifier::BOLD),
                        "◀ ",
                    )
                }
            }
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{}{}", prefix, label), label_style),
            Span::styled(format!("  {}", entry.time_label), self.theme.dim_style()),
        ]));

        let content_style = if entry.is_error {
            self.theme.error_style()
        } else {
            self.theme.base_style()
        };

        // Content is opaque text: wrapped, never interpreted.
        let content_width = width.saturating_sub(2).max(1);
        for wrapped in textwrap::wrap(&entry.content, content_width) {
            lines.push(Line::from(Span::styled(
                format!("  {}", wrapped),
                content_style,
            )));
        }

        // Empty line between entries
        lines.push(Line::from(""));

        lines
    }
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for entry in self.entries {
            all_lines.extend(self.render_entry(entry, width));
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        let paragraph = Paragraph::new(visible_lines).wrap(Wrap { trim: false });
        paragraph.render(area, buf);
    }
}

/// Total rendered height of the transcript at the given width.
///
/// Must stay in sync with the rendering logic above; the caller uses it
/// to pin the view to the newest entry.
pub fn transcript_height(entries: &[TranscriptEntry], width: usize) -> usize {
    let content_width = width.saturating_sub(2).max(1);
    entries
        .iter()
        .map(|entry| {
            // Header line + wrapped content + separator.
            1 + textwrap::wrap(&entry.content, content_width).len() + 1
        })
        .sum()
}
