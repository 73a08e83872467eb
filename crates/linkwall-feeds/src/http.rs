//! HTTP implementations of the source traits.
//!
//! - primary: `GET {base}/mentions/{term}?size=N&offset=N` → JSON array
//! - fallback: `GET {base}/search?terms=a b&size=N[&cursor=T]` → JSON object;
//!   HTTP 429 becomes a rate-limited page using the `Retry-After` header
//! - stream: `GET {url}` held open, one frame per line (see [`crate::stream`])

use crate::error::{Result, SourceError};
use crate::source::{FallbackPage, FallbackSearch, PrimaryQuery, StreamEvent, StreamTransport};
use crate::stream::{frame_error, parse_frame};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use linkwall_core::Mention;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Retry delay assumed when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
const STREAM_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Deserialize)]
struct WireMention {
    date: DateTime<Utc>,
    nick: String,
    text: String,
}

impl From<WireMention> for Mention {
    fn from(w: WireMention) -> Self {
        Mention::new(w.date, w.nick, w.text)
    }
}

#[derive(Debug, Deserialize)]
struct WireSearch {
    #[serde(default)]
    messages: Vec<WireMention>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

fn parse_base(base: &str) -> Result<Url> {
    Url::parse(base.trim_end_matches('/')).map_err(|e| SourceError::Endpoint(format!("{base}: {e}")))
}

fn join_path(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SourceError::Endpoint(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn api_error(resp: reqwest::Response) -> SourceError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    SourceError::Api { status, message }
}

pub struct HttpPrimary {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPrimary {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: parse_base(base_url)? })
    }
}

#[async_trait]
impl PrimaryQuery for HttpPrimary {
    async fn query(&self, term: &str, page_size: usize, offset: usize) -> Result<Vec<Mention>> {
        let url = join_path(&self.base_url, &["mentions", term])?;
        let resp = self
            .client
            .get(url)
            .query(&[("size", page_size), ("offset", offset)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let items: Vec<WireMention> = resp.json().await?;
        tracing::debug!(term, offset, count = items.len(), "primary page received");
        Ok(items.into_iter().map(Mention::from).collect())
    }
}

pub struct HttpFallback {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFallback {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: parse_base(base_url)? })
    }
}

fn retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[async_trait]
impl FallbackSearch for HttpFallback {
    async fn search(
        &self,
        terms: &[String],
        token: Option<&str>,
        page_size: usize,
    ) -> Result<FallbackPage> {
        let url = join_path(&self.base_url, &["search"])?;
        let mut req = self
            .client
            .get(url)
            .query(&[("terms", terms.join(" "))])
            .query(&[("size", page_size)]);
        if let Some(token) = token {
            req = req.query(&[("cursor", token)]);
        }
        let resp = req.send().await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let secs = retry_after(&resp);
            return Ok(FallbackPage::rate_limited(secs, Utc::now()));
        }
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let body: WireSearch = resp.json().await?;
        tracing::debug!(count = body.messages.len(), has_more = body.has_more, "fallback page received");
        Ok(FallbackPage {
            mentions: body.messages.into_iter().map(Mention::from).collect(),
            next_token: body.cursor,
            has_more: body.has_more,
            rate_limit: None,
        })
    }
}

pub struct HttpStream {
    client: reqwest::Client,
    url: Url,
    connection: Mutex<Option<CancellationToken>>,
}

impl HttpStream {
    pub fn new(url: &str, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self {
            client,
            url: parse_base(url)?,
            connection: Mutex::new(None),
        })
    }

    fn replace_connection(&self, token: Option<CancellationToken>) {
        let mut slot = match self.connection.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(old) = std::mem::replace(&mut *slot, token) {
            old.cancel();
        }
    }
}

#[async_trait]
impl StreamTransport for HttpStream {
    async fn connect(&self) -> Result<mpsc::Receiver<StreamEvent>> {
        let resp = self.client.get(self.url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let cancel = CancellationToken::new();
        self.replace_connection(Some(cancel.clone()));
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let mut body = resp.bytes_stream();

        tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::new();
            loop {
                let chunk = tokio::select! {
                    _ = cancel.cancelled() => break,
                    chunk = body.next() => chunk,
                };
                let bytes = match chunk {
                    Some(Ok(bytes)) => bytes,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "stream transport read failed");
                        break;
                    }
                    None => break,
                };
                buf.extend_from_slice(&bytes);

                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let raw: Vec<u8> = buf.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&raw);
                    match parse_frame(&line) {
                        Ok(Some(event)) => {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %frame_error(&line, e), "dropping malformed frame"),
                    }
                }
            }
            tracing::debug!("stream transport closed");
        });

        Ok(rx)
    }

    fn disconnect(&self) {
        self.replace_connection(None);
    }
}
