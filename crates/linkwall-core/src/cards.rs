//! Card projection — filter, classify and gate every mention into cards.
//!
//! The card list is always rebuilt from scratch from the full mention list
//! and the current [`FilterConfig`]. Cards come out in mention order, then in
//! URL order within a mention.

use crate::classify::{classify, extract_urls};
use crate::filter::{evaluate, Verdict};
use crate::settings::FilterConfig;
use crate::types::{Card, MediaKind, Mention, Platform, VisibilityMode};
use chrono::{DateTime, Utc};

/// Length of the URL tail embedded in card ids.
const ID_TAIL_LEN: usize = 12;

/// Checksum over the URL's characters (31-based rolling hash).
pub fn url_checksum(url: &str) -> u32 {
    url.chars()
        .fold(0u32, |acc, c| acc.wrapping_mul(31).wrapping_add(c as u32))
}

/// Stable id for the `index`-th URL of a mention.
pub fn card_id(mention: &Mention, index: usize, url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(ID_TAIL_LEN)..].iter().collect();
    format!(
        "{}-{}-{}-{:08x}-{}",
        mention.timestamp.timestamp_millis(),
        mention.nick,
        index,
        url_checksum(url),
        tail
    )
}

/// Id of the single card a mention without links produces.
pub fn text_card_id(mention: &Mention) -> String {
    format!("{}-{}-text", mention.timestamp.timestamp_millis(), mention.nick)
}

/// Cards for one mention. `index` is the mention's position in its list.
pub fn cards_for(
    mention: &Mention,
    index: usize,
    cfg: &FilterConfig,
    now: DateTime<Utc>,
) -> Vec<Card> {
    if let Verdict::Reject(reason) = evaluate(mention, cfg, now) {
        tracing::trace!(nick = %mention.nick, ?reason, "mention filtered");
        return Vec::new();
    }

    let urls = extract_urls(&mention.text);
    if urls.is_empty() {
        if !cfg.show_non_links {
            return Vec::new();
        }
        return vec![Card {
            id: text_card_id(mention),
            url: String::new(),
            source_url: String::new(),
            mention: index,
            platform: Platform::Other,
            kind: MediaKind::Text,
            mode: VisibilityMode::Text,
            embed_url: None,
            is_streaming: mention.is_streaming,
        }];
    }

    urls.into_iter()
        .enumerate()
        .filter_map(|(position, raw)| {
            let link = classify(raw);
            let mode = cfg.visibility(link.platform);
            if mode == VisibilityMode::Filter {
                return None;
            }
            Some(Card {
                id: card_id(mention, position, raw),
                url: link.canonical,
                source_url: link.original,
                mention: index,
                platform: link.platform,
                kind: link.kind,
                mode,
                embed_url: link.embed_url,
                is_streaming: mention.is_streaming,
            })
        })
        .collect()
}

/// Rebuild the whole card list.
pub fn build_cards(mentions: &[Mention], cfg: &FilterConfig, now: DateTime<Utc>) -> Vec<Card> {
    mentions
        .iter()
        .enumerate()
        .flat_map(|(i, m)| cards_for(m, i, cfg, now))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
