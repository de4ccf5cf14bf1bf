//! confab-api: wire types and HTTP client for the chat endpoint
//!
//! This crate is the only place that knows the JSON shapes the remote
//! service speaks: `POST <base-url>/chat` with a role/content history,
//! answered by a single `{ "content": ... }` body.

pub mod client;
pub mod error;
pub mod types;

pub use client::ChatClient;
pub use error::{Error, Result};
pub use types::{ChatRequest, ChatResponse, HistoryEntry, WireRole};
