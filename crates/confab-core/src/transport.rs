//! Transport abstraction over the remote endpoint

use async_trait::async_trait;
use confab_api::{ChatClient, HistoryEntry, Result};

/// Seam between the dispatcher and the wire.
///
/// Production uses [`HttpTransport`]; tests substitute scripted stubs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the history, await the single reply text.
    async fn exchange(&self, history: Vec<HistoryEntry>) -> Result<String>;
}

/// Transport that talks HTTP to a real endpoint.
pub struct HttpTransport {
    client: ChatClient,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: ChatClient::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, history: Vec<HistoryEntry>) -> Result<String> {
        self.client.exchange(history).await
    }
}
