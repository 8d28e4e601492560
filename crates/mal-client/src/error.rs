//! Error taxonomy for site access.

use thiserror::Error;

/// Errors produced while fetching or parsing site pages
#[derive(Debug, Error)]
pub enum ClientError {
    /// The page was served without its expected content, which is how the
    /// site answers requests from a temporarily suspended IP. Callers treat
    /// this as transient and retry after a long pause.
    #[error("page served without content, IP is likely suspended")]
    SuspectedBlock,

    /// The page has content but not the shape this crate understands.
    /// Not transient; retrying will not help.
    #[error("unexpected page shape: {0}")]
    UnexpectedPageShape(String),

    /// Non-success HTTP status
    #[error("request to {url} failed with status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Transport-level failure (connection, timeout, body read)
    #[error("http transport error")]
    Http(#[from] reqwest::Error),

    /// The anime list payload embedded in the page is not valid JSON
    #[error("anime list payload is not valid JSON")]
    ListPayload(#[from] serde_json::Error),
}

impl ClientError {
    /// Shorthand for an [`ClientError::UnexpectedPageShape`]
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        ClientError::UnexpectedPageShape(message.into())
    }
}
