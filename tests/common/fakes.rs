//! In-memory source fakes.
//!
//! Each fake implements one of the source traits from `linkwall_feeds` and
//! records how it was called, so harnesses can assert on the exact number of
//! upstream requests a navigation sequence produced.

use async_trait::async_trait;
use chrono::Utc;
use linkwall_core::Mention;
use linkwall_feeds::error::{Result, SourceError};
use linkwall_feeds::{
    ChatMessage, FallbackPage, FallbackSearch, Orchestrator, PrimaryQuery, StreamEvent,
    StreamTransport,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// FakePrimary
// ---------------------------------------------------------------------------

/// Offset-paginated primary source backed by a per-term mention list.
///
/// `query(term, size, offset)` returns `list[offset..offset + size]`. Terms
/// registered with [`FakePrimary::fail`] return an API error instead.
#[derive(Default)]
pub struct FakePrimary {
    by_term: Mutex<HashMap<String, Vec<Mention>>>,
    failing: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    log: Mutex<Vec<(String, usize)>>,
}

impl FakePrimary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_term(self: Arc<Self>, term: &str, mentions: Vec<Mention>) -> Arc<Self> {
        self.by_term.lock().unwrap().insert(term.to_string(), mentions);
        self
    }

    pub fn fail(self: Arc<Self>, term: &str) -> Arc<Self> {
        self.failing.lock().unwrap().push(term.to_string());
        self
    }

    /// Every query sleeps this long before answering.
    pub fn delayed(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(term, offset)` of every query, in call order.
    pub fn log(&self) -> Vec<(String, usize)> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrimaryQuery for FakePrimary {
    async fn query(&self, term: &str, page_size: usize, offset: usize) -> Result<Vec<Mention>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push((term.to_string(), offset));
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().iter().any(|t| t == term) {
            return Err(SourceError::Api { status: 500, message: format!("{term} unavailable") });
        }
        let all = self.by_term.lock().unwrap().get(term).cloned().unwrap_or_default();
        Ok(all.into_iter().skip(offset).take(page_size).collect())
    }
}

// ---------------------------------------------------------------------------
// FakeFallback
// ---------------------------------------------------------------------------

enum FallbackReply {
    Page(FallbackPage),
    RateLimited(u64),
    Error,
}

/// Cursor-paginated fallback that answers from a queue of scripted replies.
/// Once the queue runs dry it returns an exhausted empty page.
#[derive(Default)]
pub struct FakeFallback {
    replies: Mutex<Vec<FallbackReply>>,
    calls: AtomicUsize,
    tokens: Mutex<Vec<Option<String>>>,
}

impl FakeFallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a page; `next` is the continuation token it carries.
    pub fn page(self: Arc<Self>, mentions: Vec<Mention>, next: Option<&str>) -> Arc<Self> {
        let page = FallbackPage {
            mentions,
            next_token: next.map(str::to_string),
            has_more: next.is_some(),
            rate_limit: None,
        };
        self.replies.lock().unwrap().push(FallbackReply::Page(page));
        self
    }

    pub fn rate_limited(self: Arc<Self>, retry_after_secs: u64) -> Arc<Self> {
        self.replies.lock().unwrap().push(FallbackReply::RateLimited(retry_after_secs));
        self
    }

    pub fn error(self: Arc<Self>) -> Arc<Self> {
        self.replies.lock().unwrap().push(FallbackReply::Error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Continuation token passed on every call, in call order.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl FallbackSearch for FakeFallback {
    async fn search(
        &self,
        _terms: &[String],
        token: Option<&str>,
        _page_size: usize,
    ) -> Result<FallbackPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.map(str::to_string));
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies.remove(0))
            }
        };
        match reply {
            None => Ok(FallbackPage::default()),
            Some(FallbackReply::Page(page)) => Ok(page),
            Some(FallbackReply::RateLimited(secs)) => Ok(FallbackPage::rate_limited(secs, Utc::now())),
            Some(FallbackReply::Error) => Err(SourceError::Network("connection reset".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// FakeStream
// ---------------------------------------------------------------------------

enum StreamScript {
    /// Send this history, then keep the channel open.
    History(Vec<ChatMessage>),
    /// Connect but never send anything.
    Silent,
    /// Refuse to connect.
    Refuse,
}

/// Stream transport whose connection behaviour is scripted up front.
///
/// The sender half of the most recent connection is kept so tests can push
/// live messages with [`FakeStream::push`].
pub struct FakeStream {
    script: StreamScript,
    sender: Mutex<Option<mpsc::Sender<StreamEvent>>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl FakeStream {
    fn with(script: StreamScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            sender: Mutex::new(None),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        })
    }

    pub fn history(messages: Vec<ChatMessage>) -> Arc<Self> {
        Self::with(StreamScript::History(messages))
    }

    pub fn silent() -> Arc<Self> {
        Self::with(StreamScript::Silent)
    }

    pub fn refusing() -> Arc<Self> {
        Self::with(StreamScript::Refuse)
    }

    /// Push a live message on the current connection.
    pub async fn push(&self, message: ChatMessage) -> bool {
        let sender = self.sender.lock().unwrap().clone();
        match sender {
            Some(tx) => tx.send(StreamEvent::Message(message)).await.is_ok(),
            None => false,
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamTransport for FakeStream {
    async fn connect(&self) -> Result<mpsc::Receiver<StreamEvent>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(64);
        match &self.script {
            StreamScript::Refuse => return Err(SourceError::Network("connection refused".into())),
            StreamScript::Silent => {}
            StreamScript::History(messages) => {
                let _ = tx.send(StreamEvent::History(messages.clone())).await;
            }
        }
        *self.sender.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.sender.lock().unwrap().take();
    }
}

// ---------------------------------------------------------------------------
// Wiring helpers
// ---------------------------------------------------------------------------

pub fn orchestrator(
    primary: &Arc<FakePrimary>,
    fallback: &Arc<FakeFallback>,
    page_size: usize,
) -> Arc<Orchestrator> {
    Arc::new(Orchestrator::new(primary.clone(), fallback.clone(), page_size))
}

/// A streamed chat message at `ms`.
pub fn chat(ms: i64, nick: &str, text: &str) -> ChatMessage {
    ChatMessage {
        timestamp: super::builders::ts(ms),
        nick: nick.to_string(),
        text: text.to_string(),
        features: Vec::new(),
    }
}

pub fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
