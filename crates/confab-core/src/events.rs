//! Dispatch event types

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Events emitted while a dispatch runs.
///
/// Observers subscribe via [`Dispatcher::subscribe`] and re-render the
/// transcript on every event.
///
/// [`Dispatcher::subscribe`]: crate::dispatcher::Dispatcher::subscribe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A dispatch started; loading is now true.
    Started,

    /// A message was appended to the transcript.
    MessageAppended { message: Message },

    /// The dispatch resolved; loading is now false.
    Finished { failed: bool },
}
