//! confab-core: transcript state and message dispatch
//!
//! This crate owns the single ordered transcript of a chat session and
//! the dispatch flow that turns user input into a request against the
//! remote endpoint and reconciles the reply (or failure) back into the
//! transcript.

pub mod dispatcher;
pub mod events;
pub mod message;
pub mod transcript;
pub mod transport;

pub use dispatcher::{DIAGNOSTIC_TEXT, DispatchOutcome, Dispatcher};
pub use events::DispatchEvent;
pub use message::{APOLOGY_TEXT, Message, Role, WELCOME_TEXT};
pub use transcript::Transcript;
pub use transport::{HttpTransport, Transport};
