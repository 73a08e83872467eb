//! Link classifier — turns a raw URL from a message into a typed link.
//!
//! Classification runs in this order:
//!
//! 1. media-proxy links (`/proxy?url=<target>`) resolve to their target
//! 2. direct media by file extension, or by image-CDN heuristic
//! 3. platform by host, then the platform's sub-type rules in [`crate::embed`]
//!
//! The visibility gate and card ids live in [`crate::cards`].

use crate::embed::{embed_form, EmbedForm};
use crate::types::{MediaKind, Platform};
use phf::phf_map;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("static regex"));

/// Path of the media proxy that wraps image and video links.
pub const MEDIA_PROXY_PATH: &str = "/proxy";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov", "avi", "mkv"];

/// Hosts serving images without a file extension in the path. A `format`
/// query parameter naming a video container overrides the image default.
const IMAGE_CDNS: &[&str] = &["pbs.twimg.com", "media.discordapp.net", "i.redd.it"];

static PLATFORM_HOSTS: phf::Map<&'static str, Platform> = phf_map! {
    "youtube.com" => Platform::YouTube,
    "m.youtube.com" => Platform::YouTube,
    "music.youtube.com" => Platform::YouTube,
    "youtu.be" => Platform::YouTube,
    "twitter.com" => Platform::Twitter,
    "mobile.twitter.com" => Platform::Twitter,
    "x.com" => Platform::Twitter,
    "fxtwitter.com" => Platform::Twitter,
    "vxtwitter.com" => Platform::Twitter,
    "pbs.twimg.com" => Platform::Twitter,
    "tiktok.com" => Platform::TikTok,
    "vm.tiktok.com" => Platform::TikTok,
    "reddit.com" => Platform::Reddit,
    "old.reddit.com" => Platform::Reddit,
    "redd.it" => Platform::Reddit,
    "i.redd.it" => Platform::Reddit,
    "twitch.tv" => Platform::Twitch,
    "m.twitch.tv" => Platform::Twitch,
    "clips.twitch.tv" => Platform::Twitch,
    "kick.com" => Platform::Kick,
    "streamable.com" => Platform::Streamable,
    "instagram.com" => Platform::Instagram,
    "bsky.app" => Platform::Bluesky,
    "imgur.com" => Platform::Imgur,
    "i.imgur.com" => Platform::Imgur,
};

/// A classified link, before the visibility gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    /// The link as written in the message.
    pub original: String,
    /// Target after media-proxy resolution; equal to `original` otherwise.
    pub canonical: String,
    pub platform: Platform,
    pub kind: MediaKind,
    pub embed_url: Option<String>,
}

/// Every `http(s)://` URL in `text`, greedy up to the next whitespace, in
/// order of appearance.
pub fn extract_urls(text: &str) -> Vec<&str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Platform for a host name; `www.` is ignored.
pub fn platform_for_host(host: &str) -> Platform {
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    PLATFORM_HOSTS.get(host).copied().unwrap_or(Platform::Other)
}

/// Decode a media-proxy link to its target, if `url` is one.
pub fn resolve_proxy(url: &Url) -> Option<Url> {
    if url.path() != MEDIA_PROXY_PATH {
        return None;
    }
    let target = url
        .query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned())?;
    Url::parse(&target).ok()
}

/// Direct-media kind of `url`, if it points at an image or video file.
pub fn direct_media(url: &Url) -> Option<MediaKind> {
    let last = url.path_segments()?.next_back()?.to_ascii_lowercase();
    if let Some((_, ext)) = last.rsplit_once('.') {
        if IMAGE_EXTENSIONS.contains(&ext) {
            return Some(MediaKind::Image);
        }
        if VIDEO_EXTENSIONS.contains(&ext) {
            return Some(MediaKind::Video);
        }
    }

    let host = url.host_str()?.to_ascii_lowercase();
    if IMAGE_CDNS.contains(&host.as_str()) {
        let format = url
            .query_pairs()
            .find(|(k, _)| k == "format")
            .map(|(_, v)| v.to_ascii_lowercase());
        return match format {
            Some(f) if VIDEO_EXTENSIONS.contains(&f.as_str()) => Some(MediaKind::Video),
            _ => Some(MediaKind::Image),
        };
    }
    None
}

/// Classify one raw URL.
pub fn classify(raw: &str) -> LinkInfo {
    let Ok(original) = Url::parse(raw) else {
        return LinkInfo {
            original: raw.to_string(),
            canonical: raw.to_string(),
            platform: Platform::Other,
            kind: MediaKind::Link,
            embed_url: None,
        };
    };

    let target = resolve_proxy(&original).unwrap_or_else(|| original.clone());
    let platform = platform_for_host(target.host_str().unwrap_or_default());

    let (kind, embed_url) = match direct_media(&target) {
        Some(kind) => (kind, None),
        None => match embed_form(platform, &target) {
            EmbedForm::Embeddable { embed_url } => (MediaKind::Embed, embed_url),
            EmbedForm::Link => (MediaKind::Link, None),
        },
    };

    LinkInfo {
        original: raw.to_string(),
        canonical: target.to_string(),
        platform,
        kind,
        embed_url,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
