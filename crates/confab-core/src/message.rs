//! Chat messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Greeting shown at session start and after every reset.
pub const WELCOME_TEXT: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Fixed reply appended in place of a genuine response when a dispatch fails.
pub const APOLOGY_TEXT: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the transcript. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Opaque unique token; ordering comes from transcript position.
    pub id: Uuid,
    pub role: Role,
    /// Opaque text, never interpreted.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// True for synthetic failure replies.
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    fn new(role: Role, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_error,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, false)
    }

    /// Create a genuine assistant reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, false)
    }

    /// The seed greeting, with a fresh id and timestamp.
    pub fn welcome() -> Self {
        Self::new(Role::Assistant, WELCOME_TEXT, false)
    }

    /// Synthetic assistant reply representing a failed dispatch.
    pub fn apology() -> Self {
        Self::new(Role::Assistant, APOLOGY_TEXT, true)
    }
}
