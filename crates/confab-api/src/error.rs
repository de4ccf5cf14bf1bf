//! Error types for confab-api

use thiserror::Error;

/// Result type alias using confab-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat endpoint.
///
/// The UI collapses every variant into the same apology/diagnostic
/// outcome; the distinctions exist for logs and tests.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connection refused, DNS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("unexpected status: {status}")]
    Status { status: reqwest::StatusCode },

    /// Body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Body was JSON but not the shape we expect
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// True when the failure happened after a connection was established,
    /// i.e. the endpoint is reachable but unhappy.
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            Error::Status { .. } | Error::Json(_) | Error::UnexpectedResponse(_)
        )
    }
}
