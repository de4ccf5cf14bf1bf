//! HTTP client for the chat endpoint

use crate::{
    error::{Error, Result},
    types::{ChatRequest, ChatResponse, HistoryEntry},
};

/// Client for the remote chat endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a new client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Base URL this client talks to (trailing slashes stripped).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the accumulated history and await the single reply.
    ///
    /// Exactly one attempt: failures are returned to the caller, never
    /// retried here.
    pub async fn exchange(&self, history: Vec<HistoryEntry>) -> Result<String> {
        let url = format!("{}/chat", self.base_url);
        let request = ChatRequest { history };

        tracing::debug!(%url, messages = request.history.len(), "dispatching chat request");

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "chat endpoint returned error status");
            return Err(Error::Status { status });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        tracing::debug!(chars = parsed.content.len(), "chat reply received");
        Ok(parsed.content)
    }
}
