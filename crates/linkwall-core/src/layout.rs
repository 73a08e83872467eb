//! Layout packer — distributes cards over grid columns.
//!
//! Each card, in list order, goes to the column with the smallest estimated
//! height so far (lowest index on ties). Heights are estimates per
//! platform/media kind, never measurements. The packing is greedy, O(n·K),
//! deterministic, and recomputed from scratch whenever the cards or the
//! column count change.

use crate::types::{Card, MediaKind, Mention, Platform, VisibilityMode};

/// Viewport widths (px) at which the grid grows to 2, 3 and 4 columns.
pub const DEFAULT_BREAKPOINTS: [u32; 3] = [640, 1024, 1440];

/// Header, nick and padding common to every card.
pub const BASE_HEIGHT: u32 = 60;
/// Generic link cards never estimate taller than this body height.
pub const MAX_TEXT_HEIGHT: u32 = 240;

const CHARS_PER_LINE: usize = 48;
const LINE_HEIGHT: u32 = 20;

/// Column count for a viewport `width` in pixels.
pub fn columns_for_width(width: u32, breakpoints: &[u32; 3]) -> usize {
    1 + breakpoints.iter().filter(|&&bp| width >= bp).count()
}

/// Body height for a text or generic link card, from the message length.
pub fn text_height(text_len: usize) -> u32 {
    let lines = text_len.div_ceil(CHARS_PER_LINE).max(1) as u32;
    (lines * LINE_HEIGHT).min(MAX_TEXT_HEIGHT)
}

/// Estimated rendered height of `card`; `text_len` is the length of its
/// mention's text.
pub fn estimate_height(card: &Card, text_len: usize) -> u32 {
    let body = match (card.kind, card.mode) {
        (MediaKind::Image, _) => 300,
        (MediaKind::Video, _) => 280,
        (MediaKind::Embed, VisibilityMode::Embed) => match card.platform {
            Platform::YouTube | Platform::Twitch | Platform::Kick | Platform::Streamable => 225,
            Platform::Twitter => 420,
            Platform::TikTok => 580,
            Platform::Instagram => 540,
            Platform::Reddit => 360,
            Platform::Bluesky => 320,
            Platform::Imgur | Platform::Other => 300,
        },
        _ => text_height(text_len),
    };
    BASE_HEIGHT + body
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    /// Indices into the packed list, in list order.
    pub items: Vec<usize>,
    pub height: u32,
}

/// Greedily pack items of the given `heights` into `columns` columns.
pub fn pack(heights: &[u32], columns: usize) -> Vec<Column> {
    let mut out = vec![Column::default(); columns.max(1)];
    for (i, &h) in heights.iter().enumerate() {
        let target = out
            .iter()
            .enumerate()
            .min_by_key(|(idx, col)| (col.height, *idx))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        out[target].items.push(i);
        out[target].height += h;
    }
    out
}

/// Pack `cards` using their estimated heights.
pub fn pack_cards(cards: &[Card], mentions: &[Mention], columns: usize) -> Vec<Column> {
    let heights: Vec<u32> = cards
        .iter()
        .map(|c| {
            let len = c.mention_in(mentions).map_or(0, |m| m.text.chars().count());
            estimate_height(c, len)
        })
        .collect();
    pack(&heights, columns)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
