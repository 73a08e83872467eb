use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

/// Failure of a single call against one source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// Feed-level error. At most one is current per feed; the next successful
/// fetch or an explicit refresh clears it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// A fetch is already in flight for this feed.
    #[error("a fetch is already in progress")]
    Busy,

    #[error("rate limited by the search service, retry in {retry_after_secs}s (at {})", retry_at.format("%H:%M:%S"))]
    RateLimited {
        retry_after_secs: u64,
        retry_at: DateTime<Utc>,
    },

    #[error("fallback search failed: {0}")]
    Fallback(String),

    #[error("stream transport failed: {0}")]
    Transport(String),
}
