//! Per-feed state: the accumulated mention list, pagination cursor, chosen
//! source and the fetch guard, for one term set.
//!
//! ```text
//! Idle ──► AwaitingHistory ──► Fetching(Primary) ──► [Fetching(Fallback)] ──► Ready ⇄ FetchingMore
//! ```
//!
//! Changing the term set bumps the epoch and replaces the guard, so work
//! started for the old term set can neither block nor update the new one.

use crate::error::FeedError;
use crate::guard::FetchGuard;
use crate::orchestrator::{dedupe_terms, FetchMode, Orchestrator, Page};
use crate::source::ChatMessage;
use crate::stream::to_mention;
use linkwall_core::merge::merge_into;
use linkwall_core::{Mention, PaginationCursor, SourceKind};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    #[default]
    Idle,
    AwaitingHistory,
    Fetching(SourceKind),
    Ready,
    FetchingMore,
}

/// A fetch that holds the feed's permit. Run it anywhere; hand the
/// completion back to [`Feed::complete`].
pub struct FetchJob {
    epoch: u64,
    mode: FetchMode,
    terms: Vec<String>,
    cursor: Option<PaginationCursor>,
    orchestrator: Arc<Orchestrator>,
    permit: OwnedSemaphorePermit,
}

impl std::fmt::Debug for FetchJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchJob")
            .field("epoch", &self.epoch)
            .field("mode", &self.mode)
            .field("terms", &self.terms)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl FetchJob {
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub async fn run(self) -> FetchCompletion {
        let result = self
            .orchestrator
            .fetch(&self.terms, self.cursor.as_ref(), self.mode)
            .await;
        FetchCompletion {
            epoch: self.epoch,
            mode: self.mode,
            result,
            _permit: self.permit,
        }
    }
}

/// Result of a [`FetchJob`]. The permit is released once the completion has
/// been applied (or dropped).
pub struct FetchCompletion {
    pub epoch: u64,
    pub mode: FetchMode,
    pub result: Result<Page, FeedError>,
    _permit: OwnedSemaphorePermit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The completion belonged to a previous term set.
    Stale,
    Loaded { mode: FetchMode, added: usize },
    Failed { mode: FetchMode },
}

pub struct Feed {
    orchestrator: Arc<Orchestrator>,
    terms: Vec<String>,
    epoch: u64,
    state: FeedState,
    mentions: Vec<Mention>,
    cursor: Option<PaginationCursor>,
    source: Option<SourceKind>,
    has_more: bool,
    error: Option<FeedError>,
    guard: FetchGuard,
}

impl Feed {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            terms: Vec::new(),
            epoch: 0,
            state: FeedState::Idle,
            mentions: Vec::new(),
            cursor: None,
            source: None,
            has_more: false,
            error: None,
            guard: FetchGuard::new(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn cursor(&self) -> Option<&PaginationCursor> {
        self.cursor.as_ref()
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    /// Switch to a new term set. Unconditional: cursor, source choice,
    /// mentions and any in-flight fetch are abandoned.
    pub fn set_terms(&mut self, terms: &[String]) {
        self.terms = dedupe_terms(terms);
        self.epoch += 1;
        self.guard = FetchGuard::new();
        self.clear();
        tracing::debug!(epoch = self.epoch, terms = ?self.terms, "feed reset for new terms");
    }

    /// Drop everything fetched so far, keeping terms and epoch.
    pub fn reset(&mut self) {
        self.clear();
        tracing::debug!(epoch = self.epoch, "feed reset");
    }

    fn clear(&mut self) {
        self.state = FeedState::Idle;
        self.mentions.clear();
        self.cursor = None;
        self.source = None;
        self.has_more = false;
        self.error = None;
    }

    pub fn await_history(&mut self) {
        self.state = FeedState::AwaitingHistory;
    }

    /// Take the permit and describe the fetch to run.
    pub fn begin(&mut self, mode: FetchMode) -> Result<FetchJob, FeedError> {
        let Some(permit) = self.guard.try_acquire() else {
            tracing::debug!(?mode, "fetch rejected, another fetch holds the guard");
            return Err(FeedError::Busy);
        };
        let cursor = match mode {
            FetchMode::Initial => {
                self.state = FeedState::Fetching(SourceKind::Primary);
                None
            }
            FetchMode::AppendMore => {
                self.state = FeedState::FetchingMore;
                self.cursor.clone()
            }
        };
        Ok(FetchJob {
            epoch: self.epoch,
            mode,
            terms: self.terms.clone(),
            cursor,
            orchestrator: self.orchestrator.clone(),
            permit,
        })
    }

    /// Apply a finished fetch.
    pub fn complete(&mut self, completion: FetchCompletion) -> Applied {
        if completion.epoch != self.epoch {
            tracing::debug!(
                stale = completion.epoch,
                current = self.epoch,
                "discarding result for previous terms"
            );
            return Applied::Stale;
        }

        let mode = completion.mode;
        self.state = FeedState::Ready;
        match completion.result {
            Ok(page) => {
                if mode == FetchMode::Initial {
                    self.source = Some(page.source);
                }
                self.cursor = page.next_cursor;
                self.has_more = page.has_more;
                self.error = None;
                let added = merge_into(&mut self.mentions, page.mentions);
                tracing::debug!(?mode, added, has_more = self.has_more, "page applied");
                Applied::Loaded { mode, added }
            }
            Err(e) => {
                if mode == FetchMode::AppendMore {
                    self.has_more = false;
                }
                tracing::debug!(?mode, error = %e, "fetch failed");
                self.error = Some(e);
                Applied::Failed { mode }
            }
        }
    }

    /// Fold a history burst or live message into the list. Returns the number
    /// of new mentions.
    pub fn ingest<'a, I>(&mut self, messages: I) -> usize
    where
        I: IntoIterator<Item = &'a ChatMessage>,
    {
        let terms = &self.terms;
        let matched: Vec<Mention> = messages
            .into_iter()
            .filter_map(|m| to_mention(m, terms))
            .collect();
        if matched.is_empty() {
            return 0;
        }
        merge_into(&mut self.mentions, matched)
    }

    /// Begin and run a fetch in place, applying the result.
    pub async fn fetch(&mut self, mode: FetchMode) -> Result<Applied, FeedError> {
        let job = self.begin(mode)?;
        let completion = job.run().await;
        Ok(self.complete(completion))
    }
}
