//! linkwall — chat mentions as a navigable wall of link cards.
//!
//! This crate wires the workspace together for the binary and for the
//! integration harnesses: it builds the HTTP sources from configuration,
//! starts the feed owner, and implements the headless JSON output.
//!
//! # Architecture
//!
//! ```text
//! sources ──► orchestrator ──► feed owner ──► watch<FeedView> ──► TUI / headless
//!                                  ▲
//!                          FeedHandle commands
//! ```

pub use linkwall_core as core;
pub use linkwall_feeds as feeds;

use anyhow::Context;
use linkwall_core::config::{Config, SourcesConfig};
use linkwall_core::{Card, FilterConfig};
use linkwall_feeds::http::{HttpFallback, HttpPrimary, HttpStream};
use linkwall_feeds::{
    FeedHandle, FeedState, FeedView, Orchestrator, OwnerOptions, StreamTransport,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Sources {
    pub orchestrator: Arc<Orchestrator>,
    pub stream: Option<Arc<dyn StreamTransport>>,
}

/// Build the HTTP sources. An empty `stream_url` disables the stream.
pub fn sources_from_config(cfg: &SourcesConfig) -> anyhow::Result<Sources> {
    let timeout = cfg.request_timeout();
    let primary = HttpPrimary::new(&cfg.primary_url, timeout).context("primary source")?;
    let fallback = HttpFallback::new(&cfg.fallback_url, timeout).context("fallback source")?;
    let stream: Option<Arc<dyn StreamTransport>> = if cfg.stream_url.trim().is_empty() {
        None
    } else {
        Some(Arc::new(HttpStream::new(&cfg.stream_url, timeout).context("stream transport")?))
    };
    Ok(Sources {
        orchestrator: Arc::new(Orchestrator::new(
            Arc::new(primary),
            Arc::new(fallback),
            cfg.page_size,
        )),
        stream,
    })
}

/// Spawn the feed owner on the current runtime, loading `filter.terms`.
pub fn start_feed(
    config: &Config,
    sources: Sources,
    filter: FilterConfig,
    cancel: CancellationToken,
) -> (FeedHandle, watch::Receiver<FeedView>, JoinHandle<()>) {
    let options = OwnerOptions {
        history_timeout: config.sources.history_timeout(),
        initial_terms: filter.terms.clone(),
    };
    linkwall_feeds::spawn(sources.orchestrator, sources.stream, filter, options, cancel)
}

/// One line of headless output.
#[derive(Debug, Serialize)]
pub struct CardRecord<'a> {
    #[serde(flatten)]
    pub card: &'a Card,
    pub nick: &'a str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub matched_terms: &'a [String],
}

/// Wait for the first page to settle, then write every card as one JSON
/// object per line. Returns the number of cards written.
pub async fn run_headless<W: Write>(
    views: &mut watch::Receiver<FeedView>,
    out: &mut W,
) -> anyhow::Result<usize> {
    let view = views
        .wait_for(|v| v.state == FeedState::Ready)
        .await
        .context("feed owner stopped before the first page")?
        .clone();

    if let Some(ref err) = view.error {
        tracing::warn!(error = %err, "feed reported an error");
        eprintln!("linkwall: {err}");
    }

    for card in view.cards.iter() {
        let Some(mention) = view.mention_of(card) else {
            continue;
        };
        let record = CardRecord {
            card,
            nick: &mention.nick,
            timestamp: mention.timestamp,
            matched_terms: &mention.matched_terms,
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(view.cards.len())
}
