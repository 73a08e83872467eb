//! Source traits — the three upstreams a feed can read mentions from.
//!
//! HTTP implementations live in [`crate::http`]; tests substitute in-memory
//! fakes.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linkwall_core::Mention;
use serde::Deserialize;
use tokio::sync::mpsc;

/// Offset-paginated query, one term per call.
#[async_trait]
pub trait PrimaryQuery: Send + Sync {
    async fn query(&self, term: &str, page_size: usize, offset: usize) -> Result<Vec<Mention>>;
}

/// Rate-limit information attached to a fallback response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub retry_after_secs: u64,
    pub retry_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackPage {
    pub mentions: Vec<Mention>,
    pub next_token: Option<String>,
    pub has_more: bool,
    pub rate_limit: Option<RateLimit>,
}

impl FallbackPage {
    pub fn rate_limited(retry_after_secs: u64, now: DateTime<Utc>) -> Self {
        let retry_at = now + chrono::Duration::seconds(retry_after_secs as i64);
        Self {
            rate_limit: Some(RateLimit { retry_after_secs, retry_at }),
            ..Default::default()
        }
    }
}

/// Cursor-paginated search over the whole term set.
#[async_trait]
pub trait FallbackSearch: Send + Sync {
    async fn search(
        &self,
        terms: &[String],
        token: Option<&str>,
        page_size: usize,
    ) -> Result<FallbackPage>;
}

/// One chat message as delivered by the streaming transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub nick: String,
    #[serde(rename = "data")]
    pub text: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Backlog sent once per connection, before any live message.
    History(Vec<ChatMessage>),
    Message(ChatMessage),
}

/// Push transport. `connect` yields the event channel; the channel closes
/// when the connection ends or `disconnect` is called.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn connect(&self) -> Result<mpsc::Receiver<StreamEvent>>;
    fn disconnect(&self);
}
