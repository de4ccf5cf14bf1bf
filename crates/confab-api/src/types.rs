//! Request and response shapes for the chat endpoint

use serde::{Deserialize, Serialize};

/// Role vocabulary the endpoint understands.
///
/// The service distinguishes only the human side and its own replies;
/// the internal `assistant` role maps to `Ai` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Ai,
}

/// One prior message in the outgoing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: WireRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: WireRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub history: Vec<HistoryEntry>,
}

/// Expected success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}
