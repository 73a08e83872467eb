//! Feed owner — the single task that owns a [`Feed`], its [`Navigator`] and
//! the filter configuration.
//!
//! Everything that mutates feed state arrives as an event on the owner's
//! loop: commands from any number of [`FeedHandle`]s, fetch completions,
//! stream events and the history timer. Network work runs on spawned tasks
//! and reports back through the event channel tagged with the feed epoch, so
//! results for an abandoned term set are discarded on arrival.
//!
//! After every change the owner publishes a fresh [`FeedView`] on a
//! `watch` channel; the cards in it are always rebuilt from scratch.

use crate::error::FeedError;
use crate::feed::{Applied, Feed, FeedState, FetchCompletion};
use crate::orchestrator::{FetchMode, Orchestrator};
use crate::source::{StreamEvent, StreamTransport};
use chrono::{DateTime, Utc};
use linkwall_core::cards::build_cards;
use linkwall_core::filter::prune_mutes;
use linkwall_core::navigation::{NavOutcome, NavState, Navigator};
use linkwall_core::{Card, FilterConfig, Mention, MuteEntry, SourceKind};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    SetTerms(Vec<String>),
    Next,
    Previous,
    /// Point the cursor at a card directly (overview grid selection).
    Select(usize),
    Refresh,
    Mute { nick: String, duration: chrono::Duration },
    Unmute(String),
    Shutdown,
}

/// Cloneable sender side of the owner's command queue.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<FeedCommand>,
}

impl FeedHandle {
    /// A handle wired to a bare receiver instead of an owner task.
    pub fn detached() -> (Self, mpsc::UnboundedReceiver<FeedCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a command. Returns `false` once the owner has stopped.
    pub fn send(&self, cmd: FeedCommand) -> bool {
        self.tx.send(cmd).is_ok()
    }

    pub fn set_terms(&self, terms: Vec<String>) -> bool {
        self.send(FeedCommand::SetTerms(terms))
    }

    pub fn next(&self) -> bool {
        self.send(FeedCommand::Next)
    }

    pub fn previous(&self) -> bool {
        self.send(FeedCommand::Previous)
    }

    pub fn select(&self, index: usize) -> bool {
        self.send(FeedCommand::Select(index))
    }

    pub fn refresh(&self) -> bool {
        self.send(FeedCommand::Refresh)
    }

    pub fn mute(&self, nick: impl Into<String>, duration: chrono::Duration) -> bool {
        self.send(FeedCommand::Mute { nick: nick.into(), duration })
    }

    pub fn unmute(&self, nick: impl Into<String>) -> bool {
        self.send(FeedCommand::Unmute(nick.into()))
    }

    pub fn shutdown(&self) -> bool {
        self.send(FeedCommand::Shutdown)
    }
}

/// Snapshot of a feed, published after every change.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    pub terms: Vec<String>,
    pub state: FeedState,
    pub mentions: Arc<Vec<Mention>>,
    pub cards: Arc<Vec<Card>>,
    pub cursor: usize,
    /// A fetch is in flight or navigation is waiting on one.
    pub busy: bool,
    pub has_more: bool,
    pub error: Option<FeedError>,
    pub source: Option<SourceKind>,
    pub muted: Vec<MuteEntry>,
}

impl FeedView {
    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    pub fn mention_of(&self, card: &Card) -> Option<&Mention> {
        card.mention_in(&self.mentions)
    }
}

#[derive(Debug, Clone)]
pub struct OwnerOptions {
    pub history_timeout: Duration,
    /// Terms to load as soon as the owner starts; empty waits for `SetTerms`.
    pub initial_terms: Vec<String>,
}

impl Default for OwnerOptions {
    fn default() -> Self {
        Self {
            history_timeout: Duration::from_secs(5),
            initial_terms: Vec::new(),
        }
    }
}

enum OwnerEvent {
    Fetched(FetchCompletion),
    Stream { epoch: u64, event: StreamEvent },
    StreamFailed { epoch: u64, error: String },
}

/// Spawn the owner task.
pub fn spawn(
    orchestrator: Arc<Orchestrator>,
    stream: Option<Arc<dyn StreamTransport>>,
    filter: FilterConfig,
    options: OwnerOptions,
    cancel: CancellationToken,
) -> (FeedHandle, watch::Receiver<FeedView>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(FeedView::default());

    let owner = FeedOwner {
        feed: Feed::new(orchestrator),
        nav: Navigator::new(),
        filter,
        cards: Arc::new(Vec::new()),
        append_known: HashSet::new(),
        stream,
        stream_cancel: None,
        history_timeout: options.history_timeout,
        history_deadline: None,
        event_tx,
        view_tx,
    };
    let task = tokio::spawn(owner.run(cmd_rx, event_rx, options.initial_terms, cancel));
    (FeedHandle { tx: cmd_tx }, view_rx, task)
}

struct FeedOwner {
    feed: Feed,
    nav: Navigator,
    filter: FilterConfig,
    cards: Arc<Vec<Card>>,
    /// Ids of the cards shown while an append-fetch is pending.
    append_known: HashSet<String>,
    stream: Option<Arc<dyn StreamTransport>>,
    stream_cancel: Option<CancellationToken>,
    history_timeout: Duration,
    history_deadline: Option<Instant>,
    event_tx: mpsc::UnboundedSender<OwnerEvent>,
    view_tx: watch::Sender<FeedView>,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

impl FeedOwner {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<FeedCommand>,
        mut events: mpsc::UnboundedReceiver<OwnerEvent>,
        initial_terms: Vec<String>,
        cancel: CancellationToken,
    ) {
        if !initial_terms.is_empty() {
            self.set_terms(initial_terms);
        }
        self.publish();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                cmd = commands.recv() => match cmd {
                    Some(FeedCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(event) = events.recv() => self.handle_event(event),
                _ = sleep_until_opt(self.history_deadline), if self.history_deadline.is_some() => {
                    self.history_deadline = None;
                    if self.feed.state() == FeedState::AwaitingHistory {
                        tracing::warn!(
                            timeout_ms = self.history_timeout.as_millis() as u64,
                            "no history from stream, fetching anyway"
                        );
                        self.start_fetch(FetchMode::Initial);
                    }
                }
            }
            self.publish();
        }

        self.teardown_stream();
        tracing::debug!("feed owner stopped");
    }

    fn handle_command(&mut self, cmd: FeedCommand) {
        match cmd {
            FeedCommand::SetTerms(terms) => self.set_terms(terms),
            FeedCommand::Next => {
                let busy = self.feed.is_busy();
                match self.nav.next(self.cards.len(), self.feed.has_more(), busy) {
                    NavOutcome::FetchMore => {
                        self.append_known = self.cards.iter().map(|c| c.id.clone()).collect();
                        if !self.start_fetch(FetchMode::AppendMore) {
                            self.append_known.clear();
                            self.nav.more_failed();
                        }
                    }
                    NavOutcome::Rejected => tracing::debug!("next ignored while busy"),
                    NavOutcome::Moved(_) | NavOutcome::Refresh => {}
                }
            }
            FeedCommand::Previous => {
                // Stepping back from the first card refetches page 1, which
                // must not overtake the pending history burst.
                if self.awaiting_history() && self.nav.cursor() == 0 {
                    tracing::debug!("previous ignored while awaiting history");
                    return;
                }
                match self.nav.previous(self.feed.is_busy()) {
                    NavOutcome::Refresh => self.refresh(),
                    NavOutcome::Rejected => tracing::debug!("previous ignored while busy"),
                    NavOutcome::Moved(_) | NavOutcome::FetchMore => {}
                }
            }
            FeedCommand::Select(index) => self.nav.select(index, self.cards.len()),
            FeedCommand::Refresh => {
                if self.feed.is_busy() || self.nav.is_waiting() {
                    tracing::debug!("refresh ignored while busy");
                    return;
                }
                if self.awaiting_history() {
                    tracing::debug!("refresh ignored while awaiting history");
                    return;
                }
                self.refresh();
            }
            FeedCommand::Mute { nick, duration } => {
                let until = Utc::now()
                    .checked_add_signed(duration)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                let mut mutes = prune_mutes(&self.filter.muted_users, Utc::now());
                mutes.retain(|e| !e.nick.eq_ignore_ascii_case(&nick));
                tracing::info!(nick = %nick, %until, "muting user");
                mutes.push(MuteEntry { nick, mute_until: until });
                self.filter.muted_users = mutes;
                self.rebuild_cards();
            }
            FeedCommand::Unmute(nick) => {
                let before = self.filter.muted_users.len();
                self.filter.muted_users.retain(|e| !e.nick.eq_ignore_ascii_case(&nick));
                if self.filter.muted_users.len() != before {
                    tracing::info!(nick = %nick, "unmuting user");
                    self.rebuild_cards();
                }
            }
            FeedCommand::Shutdown => {}
        }
    }

    fn handle_event(&mut self, event: OwnerEvent) {
        match event {
            OwnerEvent::Fetched(completion) => {
                match self.feed.complete(completion) {
                    Applied::Stale => return,
                    Applied::Loaded { mode: FetchMode::Initial, .. }
                    | Applied::Failed { mode: FetchMode::Initial } => {
                        self.rebuild_cards();
                        self.nav.refresh_resolved();
                    }
                    Applied::Loaded { mode: FetchMode::AppendMore, .. } => {
                        self.project_cards();
                        let known = std::mem::take(&mut self.append_known);
                        let first_new = self.cards.iter().position(|c| !known.contains(&c.id));
                        let cursor = self.nav.more_resolved(first_new);
                        tracing::debug!(cursor, "append resolved");
                    }
                    Applied::Failed { mode: FetchMode::AppendMore } => {
                        self.append_known.clear();
                        self.nav.more_failed();
                    }
                }
            }
            OwnerEvent::Stream { epoch, event } => {
                if epoch != self.feed.epoch() {
                    return;
                }
                match event {
                    StreamEvent::History(messages) => {
                        let added = self.feed.ingest(&messages);
                        tracing::debug!(messages = messages.len(), added, "history received");
                        if self.feed.state() == FeedState::AwaitingHistory {
                            self.history_deadline = None;
                            self.start_fetch(FetchMode::Initial);
                        }
                        if added > 0 {
                            self.rebuild_cards();
                        }
                    }
                    StreamEvent::Message(message) => {
                        if self.feed.ingest([&message]) > 0 {
                            self.rebuild_cards();
                        }
                    }
                }
            }
            OwnerEvent::StreamFailed { epoch, error } => {
                if epoch != self.feed.epoch() {
                    return;
                }
                tracing::warn!(error = %FeedError::Transport(error), "continuing without live messages");
                if self.feed.state() == FeedState::AwaitingHistory {
                    self.history_deadline = None;
                    self.start_fetch(FetchMode::Initial);
                }
            }
        }
    }

    fn awaiting_history(&self) -> bool {
        self.feed.state() == FeedState::AwaitingHistory
    }

    fn set_terms(&mut self, terms: Vec<String>) {
        self.teardown_stream();
        self.feed.set_terms(&terms);
        self.nav.reset();
        self.append_known.clear();
        self.rebuild_cards();

        if self.feed.terms().is_empty() {
            return;
        }
        match self.stream.clone() {
            Some(transport) => {
                self.feed.await_history();
                self.history_deadline = Some(Instant::now() + self.history_timeout);
                self.connect_stream(transport);
            }
            None => {
                self.start_fetch(FetchMode::Initial);
            }
        }
    }

    fn refresh(&mut self) {
        self.feed.reset();
        self.rebuild_cards();
        if !self.start_fetch(FetchMode::Initial) {
            self.nav.refresh_resolved();
        }
    }

    /// Returns `false` when the guard rejected the fetch.
    fn start_fetch(&mut self, mode: FetchMode) -> bool {
        match self.feed.begin(mode) {
            Ok(job) => {
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let completion = job.run().await;
                    let _ = tx.send(OwnerEvent::Fetched(completion));
                });
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, ?mode, "fetch not started");
                false
            }
        }
    }

    fn connect_stream(&mut self, transport: Arc<dyn StreamTransport>) {
        let epoch = self.feed.epoch();
        let cancel = CancellationToken::new();
        self.stream_cancel = Some(cancel.clone());
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let connected = tokio::select! {
                _ = cancel.cancelled() => return,
                res = transport.connect() => res,
            };
            let mut rx = match connected {
                Ok(rx) => rx,
                Err(e) => {
                    let _ = tx.send(OwnerEvent::StreamFailed { epoch, error: e.to_string() });
                    return;
                }
            };
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        transport.disconnect();
                        break;
                    }
                    event = rx.recv() => match event {
                        Some(event) => {
                            if tx.send(OwnerEvent::Stream { epoch, event }).is_err() {
                                break;
                            }
                        }
                        None => {
                            tracing::debug!(epoch, "stream ended");
                            break;
                        }
                    },
                }
            }
        });
    }

    fn teardown_stream(&mut self) {
        self.history_deadline = None;
        if let Some(cancel) = self.stream_cancel.take() {
            cancel.cancel();
        }
    }

    /// Rebuild the cards for a change that did not come from a pending
    /// append (live message, mute, history), so any card it introduces is
    /// not one the append landed on.
    fn rebuild_cards(&mut self) {
        self.project_cards();
        if matches!(self.nav.state(), NavState::WaitingForMore { .. }) {
            self.append_known.extend(self.cards.iter().map(|c| c.id.clone()));
        }
    }

    fn project_cards(&mut self) {
        let now = Utc::now();
        self.filter.muted_users = prune_mutes(&self.filter.muted_users, now);
        self.cards = Arc::new(build_cards(self.feed.mentions(), &self.filter, now));
        self.nav.clamp(self.cards.len());
    }

    fn publish(&self) {
        let view = FeedView {
            terms: self.feed.terms().to_vec(),
            state: self.feed.state(),
            mentions: Arc::new(self.feed.mentions().to_vec()),
            cards: self.cards.clone(),
            cursor: self.nav.cursor(),
            busy: self.feed.is_busy() || self.nav.is_waiting(),
            has_more: self.feed.has_more(),
            error: self.feed.error().cloned(),
            source: self.feed.source(),
            muted: self.filter.muted_users.clone(),
        };
        self.view_tx.send_replace(view);
    }
}
