//! Custom widgets for the TUI

pub mod banner;
pub mod editor;
pub mod spinner;
pub mod transcript_view;

pub use banner::ErrorBanner;
pub use editor::DraftEditor;
pub use spinner::Spinner;
pub use transcript_view::{Speaker, TranscriptEntry, TranscriptView, transcript_height};
