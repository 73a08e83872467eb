//! Filter pipeline — decides whether a mention may produce cards at all.
//!
//! Rules run in a fixed order and the first match rejects:
//!
//! 1. NSFW marker while NSFW display is off
//! 2. NSFL marker while NSFL display is off
//! 3. banned term anywhere in the text (case-insensitive)
//! 4. nick equal to a banned user (case-insensitive)
//! 5. nick under an unexpired mute
//!
//! Expired mutes are pruned with [`prune_mutes`] before rule 5 on every call.

use crate::settings::FilterConfig;
use crate::types::{Mention, MuteEntry};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static NSFW_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnsfw\b").expect("static regex"));
static NSFL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnsfl\b").expect("static regex"));

/// Why a mention was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Nsfw,
    Nsfl,
    BannedTerm(String),
    BannedUser,
    Muted { until: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Reject(Rejection),
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        matches!(self, Verdict::Keep)
    }
}

pub fn is_nsfw(text: &str) -> bool {
    NSFW_MARKER.is_match(text)
}

pub fn is_nsfl(text: &str) -> bool {
    NSFL_MARKER.is_match(text)
}

/// Drop mutes whose deadline is not after `now`. Pure and idempotent.
pub fn prune_mutes(entries: &[MuteEntry], now: DateTime<Utc>) -> Vec<MuteEntry> {
    entries.iter().filter(|e| e.is_active(now)).cloned().collect()
}

/// Run the rule chain against one mention.
pub fn evaluate(mention: &Mention, cfg: &FilterConfig, now: DateTime<Utc>) -> Verdict {
    if !cfg.show_nsfw && is_nsfw(&mention.text) {
        return Verdict::Reject(Rejection::Nsfw);
    }
    if !cfg.show_nsfl && is_nsfl(&mention.text) {
        return Verdict::Reject(Rejection::Nsfl);
    }

    let text = mention.text.to_lowercase();
    if let Some(term) = cfg
        .banned_terms
        .iter()
        .find(|t| !t.is_empty() && text.contains(&t.to_lowercase()))
    {
        return Verdict::Reject(Rejection::BannedTerm(term.clone()));
    }

    let nick = mention.nick.to_lowercase();
    if cfg.banned_users.iter().any(|u| u.to_lowercase() == nick) {
        return Verdict::Reject(Rejection::BannedUser);
    }

    let mutes = prune_mutes(&cfg.muted_users, now);
    if let Some(entry) = mutes.iter().find(|e| e.nick.to_lowercase() == nick) {
        return Verdict::Reject(Rejection::Muted { until: entry.mute_until });
    }

    Verdict::Keep
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
