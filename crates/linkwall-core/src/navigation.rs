//! Cursor state machine over an ordered card list.
//!
//! The navigator never performs I/O. When the cursor runs off either end it
//! hands back a [`NavOutcome`] asking the caller to fetch, then waits to be
//! told how the fetch went through [`Navigator::more_resolved`],
//! [`Navigator::more_failed`] or [`Navigator::refresh_resolved`].

/// What the navigator is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    /// An append-fetch was requested while the list held `from_len` cards.
    WaitingForMore { from_len: usize },
    /// A full reset and refetch of page 1 was requested.
    Resetting,
}

/// Result of one navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Cursor now points at this index.
    Moved(usize),
    /// Caller must start an append-fetch.
    FetchMore,
    /// Caller must reset the feed and fetch page 1 again.
    Refresh,
    /// Navigation while a fetch is in flight; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    cursor: usize,
    state: NavState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn is_waiting(&self) -> bool {
        self.state != NavState::Idle
    }

    /// Advance one card. `busy` is the feed's fetch guard.
    pub fn next(&mut self, len: usize, has_more: bool, busy: bool) -> NavOutcome {
        if busy || self.is_waiting() {
            return NavOutcome::Rejected;
        }
        if len == 0 {
            self.cursor = 0;
            return NavOutcome::Moved(0);
        }
        if self.cursor + 1 < len {
            self.cursor += 1;
            return NavOutcome::Moved(self.cursor);
        }
        if has_more {
            self.state = NavState::WaitingForMore { from_len: len };
            return NavOutcome::FetchMore;
        }
        self.cursor = 0;
        NavOutcome::Moved(0)
    }

    /// Retreat one card; at the first card request a refresh.
    pub fn previous(&mut self, busy: bool) -> NavOutcome {
        if busy || self.is_waiting() {
            return NavOutcome::Rejected;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
            return NavOutcome::Moved(self.cursor);
        }
        self.state = NavState::Resetting;
        NavOutcome::Refresh
    }

    /// The append-fetch finished. `first_new` is the index of the first card
    /// the appended page contributed; `None` when it added nothing, which
    /// wraps to the first card. The caller decides what counts as new, since
    /// live messages can grow the list while the fetch is in flight.
    pub fn more_resolved(&mut self, first_new: Option<usize>) -> usize {
        if let NavState::WaitingForMore { .. } = self.state {
            self.cursor = first_new.unwrap_or(0);
        }
        self.state = NavState::Idle;
        self.cursor
    }

    /// The append-fetch failed: stay on the current card.
    pub fn more_failed(&mut self) {
        self.state = NavState::Idle;
    }

    /// A reset-refetch finished.
    pub fn refresh_resolved(&mut self) {
        self.cursor = 0;
        self.state = NavState::Idle;
    }

    /// Forget pending work and return to the first card (term change).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keep the cursor inside a list that changed length outside of
    /// navigation (filter change, live message).
    pub fn clamp(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// Jump straight to `index`, used by the overview grid.
    pub fn select(&mut self, index: usize, len: usize) {
        if !self.is_waiting() && index < len {
            self.cursor = index;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
