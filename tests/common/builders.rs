//! Test builders — ergonomic constructors for `Mention`, `Card` lists and
//! filter configurations.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, TimeZone, Utc};
use linkwall_core::{FilterConfig, Mention, MuteEntry, Platform, VisibilityMode};

/// Fixed "now" used by harnesses that evaluate filters.
pub const NOW_MS: i64 = 1_700_000_000_000;

pub fn now() -> DateTime<Utc> {
    ts(NOW_MS)
}

pub fn ts(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

// ---------------------------------------------------------------------------
// MentionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Mention`] fixtures.
///
/// ```rust
/// let m = MentionBuilder::new("check https://youtu.be/abc")
///     .nick("ferris")
///     .at(1_000)
///     .term("rust")
///     .build();
/// ```
pub struct MentionBuilder {
    timestamp: DateTime<Utc>,
    nick: String,
    text: String,
    is_streaming: bool,
    terms: Vec<String>,
}

impl MentionBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: now(),
            nick: "tester".to_string(),
            text: text.into(),
            is_streaming: false,
            terms: Vec::new(),
        }
    }

    pub fn nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = nick.into();
        self
    }

    /// Timestamp in epoch milliseconds.
    pub fn at(mut self, ms: i64) -> Self {
        self.timestamp = ts(ms);
        self
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }

    pub fn streaming(mut self) -> Self {
        self.is_streaming = true;
        self
    }

    pub fn build(self) -> Mention {
        let mut m = Mention::new(self.timestamp, self.nick, self.text);
        m.is_streaming = self.is_streaming;
        for t in &self.terms {
            m.add_term(t);
        }
        m
    }
}

/// Shorthand: a mention at `ms` by `nick`.
pub fn mention(ms: i64, nick: &str, text: &str) -> Mention {
    MentionBuilder::new(text).nick(nick).at(ms).build()
}

/// `n` distinct mentions, newest first, each carrying one example link.
pub fn link_mentions(n: usize, start_ms: i64) -> Vec<Mention> {
    (0..n)
        .map(|i| {
            mention(
                start_ms - i as i64 * 1_000,
                &format!("user{i}"),
                &format!("link https://example.com/{i}"),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FilterConfig helpers
// ---------------------------------------------------------------------------

pub struct FilterBuilder {
    cfg: FilterConfig,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self { cfg: FilterConfig::default() }
    }

    pub fn terms(mut self, terms: &[&str]) -> Self {
        self.cfg.terms = terms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn show_non_links(mut self) -> Self {
        self.cfg.show_non_links = true;
        self
    }

    pub fn banned_term(mut self, term: &str) -> Self {
        self.cfg.banned_terms.push(term.to_string());
        self
    }

    pub fn banned_user(mut self, nick: &str) -> Self {
        self.cfg.banned_users.push(nick.to_string());
        self
    }

    pub fn mute(mut self, nick: &str, until: DateTime<Utc>) -> Self {
        self.cfg.muted_users.push(MuteEntry { nick: nick.to_string(), mute_until: until });
        self
    }

    pub fn visibility(mut self, platform: Platform, mode: VisibilityMode) -> Self {
        self.cfg.platform_visibility.insert(platform, mode);
        self
    }

    pub fn build(self) -> FilterConfig {
        self.cfg
    }
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
