//! Embed-URL synthesis: per-platform rules deciding whether a link is an
//! embeddable post/video and, where the platform has one, rewriting it to the
//! canonical embeddable form.

use crate::types::Platform;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static COMPOUND_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").expect("static regex")
});

/// Outcome of the platform sub-type rules for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedForm {
    /// Profile pages, short clips and anything else the platform cannot embed.
    Link,
    /// An embeddable post or video. `embed_url` is `None` when the renderer
    /// resolves the embed from the original link itself.
    Embeddable { embed_url: Option<String> },
}

/// Parse a start-time parameter: bare seconds (`"90"`) or a compound
/// `NhNmNs` string where each component is optional (`"1h2m3s"`, `"4m"`).
pub fn parse_start_time(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    let lowered = raw.to_ascii_lowercase();
    let caps = COMPOUND_TIME.captures(&lowered)?;
    // Digits come straight from chat; anything that overflows is not a time.
    let part = |i: usize, scale: u64| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<u64>().ok()?.checked_mul(scale),
            None => Some(0),
        }
    };
    part(1, 3600)?
        .checked_add(part(2, 60)?)?
        .checked_add(part(3, 1)?)
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default()
}

/// Apply the platform's sub-type rules to `url`.
pub fn embed_form(platform: Platform, url: &Url) -> EmbedForm {
    let segs = segments(url);
    let host = url.host_str().unwrap_or_default().trim_start_matches("www.");
    match platform {
        Platform::YouTube => youtube(url, host, &segs),
        Platform::Twitter => match segs.as_slice() {
            [_, "status", id, ..] if is_numeric(id) => EmbedForm::Embeddable {
                embed_url: Some(format!("https://platform.twitter.com/embed/Tweet.html?id={id}")),
            },
            _ => EmbedForm::Link,
        },
        Platform::TikTok => match segs.as_slice() {
            [user, "video", id, ..] if user.starts_with('@') && is_numeric(id) => {
                EmbedForm::Embeddable {
                    embed_url: Some(format!("https://www.tiktok.com/embed/v2/{id}")),
                }
            }
            _ => EmbedForm::Link,
        },
        Platform::Reddit => match segs.as_slice() {
            ["r", _, "comments", _, ..] => EmbedForm::Embeddable {
                embed_url: Some(format!("https://embed.reddit.com{}", url.path())),
            },
            _ => EmbedForm::Link,
        },
        Platform::Twitch => twitch(host, &segs),
        Platform::Kick => match segs.as_slice() {
            [channel] => EmbedForm::Embeddable {
                embed_url: Some(format!("https://player.kick.com/{channel}")),
            },
            _ => EmbedForm::Link,
        },
        Platform::Streamable => match segs.as_slice() {
            [id] | ["e", id] => EmbedForm::Embeddable {
                embed_url: Some(format!("https://streamable.com/e/{id}")),
            },
            _ => EmbedForm::Link,
        },
        Platform::Instagram => match segs.as_slice() {
            [kind @ ("p" | "reel"), id, ..] => EmbedForm::Embeddable {
                embed_url: Some(format!("https://www.instagram.com/{kind}/{id}/embed")),
            },
            _ => EmbedForm::Link,
        },
        Platform::Bluesky => match segs.as_slice() {
            ["profile", _, "post", _] => EmbedForm::Embeddable { embed_url: None },
            _ => EmbedForm::Link,
        },
        Platform::Imgur | Platform::Other => EmbedForm::Link,
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn youtube(url: &Url, host: &str, segs: &[&str]) -> EmbedForm {
    let id = if host == "youtu.be" {
        segs.first().map(|s| s.to_string())
    } else {
        match segs {
            ["watch"] => query_param(url, "v"),
            ["embed" | "live" | "v", id, ..] => Some(id.to_string()),
            // Shorts share the domain but have no embeddable form.
            _ => None,
        }
    };
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        return EmbedForm::Link;
    };

    let start = query_param(url, "t")
        .or_else(|| query_param(url, "start"))
        .or_else(|| url.fragment().and_then(|f| f.strip_prefix("t=")).map(str::to_string))
        .and_then(|t| parse_start_time(&t))
        .filter(|&s| s > 0);

    let embed_url = match start {
        Some(secs) => format!("https://www.youtube.com/embed/{id}?start={secs}"),
        None => format!("https://www.youtube.com/embed/{id}"),
    };
    EmbedForm::Embeddable { embed_url: Some(embed_url) }
}

fn twitch(host: &str, segs: &[&str]) -> EmbedForm {
    let embed_url = match (host, segs) {
        ("clips.twitch.tv", [slug]) => format!("https://clips.twitch.tv/embed?clip={slug}"),
        (_, [_, "clip", slug]) => format!("https://clips.twitch.tv/embed?clip={slug}"),
        (_, ["videos", id]) if is_numeric(id) => format!("https://player.twitch.tv/?video={id}"),
        (_, [channel]) if !matches!(*channel, "directory" | "downloads" | "p" | "settings") => {
            format!("https://player.twitch.tv/?channel={channel}")
        }
        _ => return EmbedForm::Link,
    };
    EmbedForm::Embeddable { embed_url: Some(embed_url) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
