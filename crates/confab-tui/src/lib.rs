//! confab-tui: terminal UI components
//!
//! Input decoding, the draft editor, and the transcript widgets, built
//! on ratatui and crossterm. This crate is presentation only: widgets
//! render view models handed to them and own no session state beyond
//! the draft text.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
