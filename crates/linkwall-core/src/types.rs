//! Core types for linkwall-core.
//!
//! This module defines the data shared across every layer: the [`Mention`]
//! aggregated from the sources, the [`Card`] projected from it, the
//! [`PaginationCursor`] a feed pages with, and the small enums that classify
//! links ([`Platform`], [`MediaKind`], [`VisibilityMode`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message that matched at least one search term.
///
/// Identity is the `(timestamp, nick)` pair; see [`Mention::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub timestamp: DateTime<Utc>,
    pub nick: String,
    pub text: String,
    /// True when the mention was delivered by the streaming transport.
    pub is_streaming: bool,
    /// Terms this mention matched, in first-seen order, without duplicates.
    pub matched_terms: Vec<String>,
}

impl Mention {
    pub fn new(
        timestamp: DateTime<Utc>,
        nick: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            nick: nick.into(),
            text: text.into(),
            is_streaming: false,
            matched_terms: Vec::new(),
        }
    }

    pub fn key(&self) -> MentionKey {
        (self.timestamp, self.nick.clone())
    }

    /// Append `term` unless an equal term is already recorded.
    pub fn add_term(&mut self, term: &str) {
        if !self.matched_terms.iter().any(|t| t == term) {
            self.matched_terms.push(term.to_string());
        }
    }
}

/// Identity key of a [`Mention`].
pub type MentionKey = (DateTime<Utc>, String);

/// Which upstream source served a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Primary,
    Fallback,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Primary => write!(f, "primary"),
            SourceKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// Next page boundary for the source a feed is paging.
///
/// The primary source pages by offset, the fallback by opaque continuation
/// token. A feed only ever holds the variant of its chosen source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationCursor {
    Offset(usize),
    ContinuationToken(String),
}

impl PaginationCursor {
    pub fn source(&self) -> SourceKind {
        match self {
            PaginationCursor::Offset(_) => SourceKind::Primary,
            PaginationCursor::ContinuationToken(_) => SourceKind::Fallback,
        }
    }
}

/// Time-bounded suppression of one user's mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteEntry {
    pub nick: String,
    pub mute_until: DateTime<Utc>,
}

impl MuteEntry {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.mute_until > now
    }
}

/// Origin service of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Twitter,
    TikTok,
    Reddit,
    Twitch,
    Kick,
    Streamable,
    Instagram,
    Bluesky,
    Imgur,
    /// Any host without a dedicated entry.
    Other,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Platform::YouTube,
        Platform::Twitter,
        Platform::TikTok,
        Platform::Reddit,
        Platform::Twitch,
        Platform::Kick,
        Platform::Streamable,
        Platform::Instagram,
        Platform::Bluesky,
        Platform::Imgur,
        Platform::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Twitter => "twitter",
            Platform::TikTok => "tiktok",
            Platform::Reddit => "reddit",
            Platform::Twitch => "twitch",
            Platform::Kick => "kick",
            Platform::Streamable => "streamable",
            Platform::Instagram => "instagram",
            Platform::Bluesky => "bluesky",
            Platform::Imgur => "imgur",
            Platform::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Platform> {
        let name = name.trim().to_ascii_lowercase();
        Platform::ALL.into_iter().find(|p| p.as_str() == name).or(match name.as_str() {
            "x" => Some(Platform::Twitter),
            "generic" | "link" | "links" => Some(Platform::Other),
            _ => None,
        })
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a card shows once rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Direct image file or image CDN link.
    Image,
    /// Direct video file.
    Video,
    /// A platform post, clip or video with an embeddable form.
    Embed,
    /// Any other link, including platform links that cannot be embedded.
    Link,
    /// A mention without links.
    Text,
}

/// Per-platform rendering choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Drop links to this platform entirely.
    Filter,
    /// Show the link as plain text.
    Text,
    /// Hand the link to the platform's embed renderer.
    #[default]
    Embed,
}

impl VisibilityMode {
    pub fn parse(s: &str) -> Option<VisibilityMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filter" | "hide" | "hidden" => Some(VisibilityMode::Filter),
            "text" => Some(VisibilityMode::Text),
            "embed" => Some(VisibilityMode::Embed),
            _ => None,
        }
    }
}

/// A renderable unit: one link of a mention, or one mention without links.
///
/// Cards never own their mention; `mention` indexes the mention list the
/// card list was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    /// Canonical target of the link, after media-proxy resolution.
    pub url: String,
    /// The link as written in the message. Empty for text cards.
    pub source_url: String,
    pub mention: usize,
    pub platform: Platform,
    pub kind: MediaKind,
    pub mode: VisibilityMode,
    pub embed_url: Option<String>,
    pub is_streaming: bool,
}

impl Card {
    /// Resolve the originating mention in the list this card was built from.
    pub fn mention_in<'a>(&self, mentions: &'a [Mention]) -> Option<&'a Mention> {
        mentions.get(self.mention)
    }

    /// Platform tag shown to the user, derived from the link as written.
    pub fn display_host(&self) -> String {
        url::Url::parse(&self.source_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn add_term_skips_duplicates() {
        let ts = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut m = Mention::new(ts, "alice", "hello");
        m.add_term("rust");
        m.add_term("tokio");
        m.add_term("rust");
        assert_eq!(m.matched_terms, vec!["rust", "tokio"]);
    }

    #[test]
    fn cursor_variant_names_its_source() {
        assert_eq!(PaginationCursor::Offset(50).source(), SourceKind::Primary);
        assert_eq!(
            PaginationCursor::ContinuationToken("abc".into()).source(),
            SourceKind::Fallback
        );
    }

    #[test]
    fn platform_names_round_trip() {
        for p in Platform::ALL {
            assert_eq!(Platform::from_name(p.as_str()), Some(p));
        }
        assert_eq!(Platform::from_name("X"), Some(Platform::Twitter));
        assert_eq!(Platform::from_name("myspace"), None);
    }

    #[test]
    fn display_host_strips_www() {
        let card = Card {
            id: "x".into(),
            url: "https://www.youtube.com/watch?v=abc".into(),
            source_url: "https://www.youtube.com/watch?v=abc".into(),
            mention: 0,
            platform: Platform::YouTube,
            kind: MediaKind::Embed,
            mode: VisibilityMode::Embed,
            embed_url: None,
            is_streaming: false,
        };
        assert_eq!(card.display_host(), "youtube.com");
    }
}
