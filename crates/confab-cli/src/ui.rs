//! TUI implementation for confab

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, EventStream, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use confab_core::{DispatchEvent, Dispatcher, Message, Role, Transcript};
use confab_tui::{
    Theme,
    input::{Action, key_to_action},
    widgets::{DraftEditor, ErrorBanner, Spinner, TranscriptEntry, TranscriptView, transcript_height},
};

/// Spinner label while a dispatch is outstanding.
const THINKING_LABEL: &str = "AI is thinking...";

/// Build the view model for one message.
fn entry_from(message: &Message) -> TranscriptEntry {
    let time_label = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M")
        .to_string();
    match message.role {
        Role::User => TranscriptEntry::user(message.content.clone(), time_label),
        Role::Assistant => TranscriptEntry::assistant(message.content.clone(), time_label)
            .with_error(message.is_error),
    }
}

/// TUI application state.
///
/// Mirrors the transcript store for rendering: rebuilt wholesale via
/// [`sync`] whenever the dispatcher is free, patched from broadcast
/// events while a dispatch future is in flight.
///
/// [`sync`]: TuiState::sync
pub struct TuiState {
    /// Rendered transcript entries
    entries: Vec<TranscriptEntry>,
    /// Mirror of the store's loading flag
    is_loading: bool,
    /// Mirror of the store's error flag
    error: Option<String>,
    /// Draft editor (Input Capture)
    editor: DraftEditor,
    /// Current scroll position; usize::MAX pins to the newest entry
    scroll: usize,
    /// Largest valid scroll offset, updated during render
    max_scroll: usize,
    /// Title shown on the transcript border
    title: String,
    theme: Theme,
    /// Spinner start time for animation
    spinner_start: Instant,
}

impl TuiState {
    pub fn new(theme: Theme, endpoint: &str) -> Self {
        let editor = DraftEditor::new()
            .with_placeholder("Type your message... (Enter to send, Shift+Enter for a new line)");
        Self {
            entries: vec![],
            is_loading: false,
            error: None,
            editor,
            scroll: usize::MAX,
            max_scroll: 0,
            title: format!(" confab │ {} ", endpoint),
            theme,
            spinner_start: Instant::now(),
        }
    }

    /// Rebuild the view from the store.
    pub fn sync(&mut self, transcript: &Transcript) {
        self.entries = transcript.messages().iter().map(entry_from).collect();
        self.is_loading = transcript.is_loading();
        self.error = transcript.error().map(str::to_string);
        self.scroll_to_bottom();
    }

    /// Patch the view from a dispatch event (used while the store is
    /// borrowed by an in-flight send).
    pub fn handle_dispatch_event(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Started => {
                self.is_loading = true;
                self.error = None;
                self.spinner_start = Instant::now();
            }
            DispatchEvent::MessageAppended { message } => {
                self.entries.push(entry_from(&message));
                self.scroll_to_bottom();
            }
            DispatchEvent::Finished { failed } => {
                self.is_loading = false;
                if failed {
                    self.error = Some(confab_core::DIAGNOSTIC_TEXT.to_string());
                }
            }
        }
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved against content height during render.
        self.scroll = usize::MAX;
    }

    fn scroll_up(&mut self, lines: usize) {
        if self.scroll == usize::MAX {
            self.scroll = self.max_scroll;
        }
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        if self.scroll != usize::MAX {
            self.scroll = self.scroll.saturating_add(lines);
        }
    }

    fn handle_mouse(&mut self, kind: MouseEventKind) {
        match kind {
            MouseEventKind::ScrollUp => self.scroll_up(3),
            MouseEventKind::ScrollDown => self.scroll_down(3),
            _ => {}
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let editor_height = self.editor.desired_height(size.width);

        // Layout: transcript (flex), error banner (if any), status, editor
        let mut constraints = vec![Constraint::Min(1)];
        if self.error.is_some() {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(editor_height));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);

        let mut idx = 0;
        self.render_transcript(frame, chunks[idx]);
        idx += 1;

        if let Some(error) = self.error.clone() {
            frame.render_widget(ErrorBanner::new(&error, &self.theme), chunks[idx]);
            idx += 1;
        }

        self.render_status(frame, chunks[idx]);
        idx += 1;

        self.editor
            .render(chunks[idx], frame.buffer_mut(), &self.theme);
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(self.title.clone());

        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let content_height = transcript_height(&self.entries, inner.width as usize);
        self.max_scroll = content_height.saturating_sub(inner.height as usize);

        if self.scroll == usize::MAX {
            // Auto-scroll: pin to the newest entry
            self.scroll = self.max_scroll;
        } else {
            self.scroll = self.scroll.min(self.max_scroll);
        }

        let view = TranscriptView::new(&self.entries, &self.theme).scroll(self.scroll);
        frame.render_widget(view, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_loading {
            let spinner =
                Spinner::new(THINKING_LABEL, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
        } else {
            let help = "Enter: send │ Shift+Enter: newline │ Ctrl+L: reset │ Ctrl+C: quit";
            let status = Paragraph::new(Line::styled(help, self.theme.dim_style()));
            frame.render_widget(status, area);
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run_tui(dispatcher: &mut Dispatcher, theme: Theme, endpoint: &str) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = TuiState::new(theme, endpoint);
    state.sync(dispatcher.transcript());

    // Subscribe before any dispatch so in-flight events reach the view.
    let mut events_rx = dispatcher.subscribe();
    let mut event_stream = EventStream::new();

    // Tick interval for the spinner animation
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    // Submitted draft waiting to be dispatched; picked up at the top of
    // the next loop iteration so the send future can borrow the
    // dispatcher for its whole lifetime.
    let mut pending_prompt: Option<String> = None;

    let result = loop {
        if let Some(content) = pending_prompt.take() {
            let mut pending_reset = false;
            {
                let mut send_future = std::pin::pin!(dispatcher.send(&content));

                // Poll the dispatch alongside UI events so the terminal
                // stays responsive during the round trip.
                loop {
                    terminal.draw(|frame| state.render(frame))?;

                    tokio::select! {
                        biased;

                        _ = &mut send_future => break,

                        event = events_rx.recv() => {
                            if let Ok(event) = event {
                                state.handle_dispatch_event(event);
                            }
                        }

                        event = event_stream.next() => {
                            match event {
                                Some(Ok(Event::Key(key))) => {
                                    match key_to_action(key) {
                                        Action::Interrupt | Action::Quit => {
                                            restore_terminal(&mut terminal)?;
                                            return Ok(());
                                        }
                                        // A reset mid-flight applies once the
                                        // dispatch resolves; the response is
                                        // discarded with everything else.
                                        Action::Reset => pending_reset = true,
                                        // New sends are rejected, not queued;
                                        // no banner exists mid-flight.
                                        Action::Submit | Action::Escape => {}
                                        Action::PageUp => state.scroll_up(10),
                                        Action::PageDown => state.scroll_down(10),
                                        action => {
                                            // Typing stays available
                                            state.editor.handle_action(&action);
                                        }
                                    }
                                }
                                Some(Ok(Event::Paste(text))) => {
                                    state.editor.handle_action(&Action::Paste(text));
                                }
                                Some(Ok(Event::Mouse(mouse))) => state.handle_mouse(mouse.kind),
                                Some(Ok(Event::Resize(_, _))) => {}
                                Some(Err(e)) => {
                                    restore_terminal(&mut terminal)?;
                                    return Err(e.into());
                                }
                                None => {
                                    restore_terminal(&mut terminal)?;
                                    return Ok(());
                                }
                                _ => {}
                            }
                        }

                        _ = tick_interval.tick() => {}
                    }
                }
            }

            // Drain remaining events, then re-sync from the store.
            while let Ok(event) = events_rx.try_recv() {
                state.handle_dispatch_event(event);
            }
            if pending_reset {
                dispatcher.reset();
            }
            state.sync(dispatcher.transcript());
            continue;
        }

        terminal.draw(|frame| state.render(frame))?;

        tokio::select! {
            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        match key_to_action(key) {
                            Action::Submit => {
                                // The input boundary: only dispatch a
                                // non-blank draft while idle.
                                if !state.editor.is_blank() && !state.is_loading {
                                    pending_prompt = Some(state.editor.take());
                                }
                            }
                            Action::Escape => {
                                dispatcher.dismiss_error();
                                state.sync(dispatcher.transcript());
                            }
                            Action::Reset => {
                                dispatcher.reset();
                                state.sync(dispatcher.transcript());
                            }
                            Action::Interrupt | Action::Quit => break Ok(()),
                            Action::PageUp => state.scroll_up(10),
                            Action::PageDown => state.scroll_down(10),
                            action => {
                                state.editor.handle_action(&action);
                            }
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        state.editor.handle_action(&Action::Paste(text));
                    }
                    Some(Ok(Event::Mouse(mouse))) => state.handle_mouse(mouse.kind),
                    Some(Ok(Event::Resize(_, _))) => {}
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                    _ => {}
                }
            }

            _ = tick_interval.tick() => {}
        }
    };

    restore_terminal(&mut terminal)?;
    result
}
