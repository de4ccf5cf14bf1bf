//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter: submit the draft
    Submit,
    /// Shift+Enter / Alt+Enter: literal newline into the draft
    NewLine,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Move cursor up a line
    Up,
    /// Move cursor down a line
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Scroll transcript up
    PageUp,
    /// Scroll transcript down
    PageDown,
    /// Escape: dismiss the error banner
    Escape,
    /// Ctrl+C (quit)
    Interrupt,
    /// Ctrl+Q (quit)
    Quit,
    /// Ctrl+L (reset the transcript)
    Reset,
    /// Ctrl+U (clear the draft)
    ClearLine,
    /// Paste (from clipboard or bracketed paste)
    Paste(String),
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    // Handle Ctrl combinations first
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('l') => Action::Reset,
            KeyCode::Char('u') => Action::ClearLine,
            // Ctrl+J is a newline in most terminals
            KeyCode::Char('j') | KeyCode::Enter => Action::NewLine,
            _ => Action::Unknown,
        };
    }

    // Alt+Enter inserts a newline in terminals that don't report
    // Shift+Enter as a distinct key
    if modifiers.contains(KeyModifiers::ALT) {
        return match code {
            KeyCode::Enter => Action::NewLine,
            _ => Action::Unknown,
        };
    }

    // Regular keys
    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => {
            if modifiers.contains(KeyModifiers::SHIFT) {
                Action::NewLine
            } else {
                Action::Submit
            }
        }
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}
