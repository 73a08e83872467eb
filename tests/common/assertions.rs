//! Domain-specific assertion macros for linkwall harnesses.
//!
//! These add context-rich failure messages that make it clear *which* feed
//! property was violated: ordering, identity, term attribution or card
//! projection.

// ---------------------------------------------------------------------------
// Mention list assertions
// ---------------------------------------------------------------------------

/// Assert a mention list is sorted newest first.
///
/// ```rust
/// assert_newest_first!(feed.mentions());
/// ```
#[macro_export]
macro_rules! assert_newest_first {
    ($mentions:expr) => {{
        let mentions: &[linkwall_core::Mention] = &$mentions;
        for (i, pair) in mentions.windows(2).enumerate() {
            if pair[0].timestamp < pair[1].timestamp {
                panic!(
                    "assert_newest_first! failed at index {}:\n  [{}] {} {}\n  [{}] {} {}",
                    i,
                    i,
                    pair[0].timestamp,
                    pair[0].nick,
                    i + 1,
                    pair[1].timestamp,
                    pair[1].nick
                );
            }
        }
    }};
}

/// Assert no two mentions share a `(timestamp, nick)` key.
#[macro_export]
macro_rules! assert_unique_keys {
    ($mentions:expr) => {{
        let mentions: &[linkwall_core::Mention] = &$mentions;
        let mut seen = std::collections::HashSet::new();
        for m in mentions {
            if !seen.insert(m.key()) {
                panic!(
                    "assert_unique_keys! failed: duplicate mention {} {}\n  total: {}",
                    m.timestamp,
                    m.nick,
                    mentions.len()
                );
            }
        }
    }};
}

/// Assert the matched terms of the mention keyed `(ms, nick)`.
///
/// ```rust
/// assert_terms!(feed.mentions(), (1_000, "ferris"), ["rust", "crab"]);
/// ```
#[macro_export]
macro_rules! assert_terms {
    ($mentions:expr, ($ms:expr, $nick:expr), [$($term:expr),* $(,)?]) => {{
        let mentions: &[linkwall_core::Mention] = &$mentions;
        let expected: Vec<String> = vec![$($term.to_string()),*];
        let found = mentions
            .iter()
            .find(|m| m.timestamp.timestamp_millis() == $ms && m.nick == $nick);
        match found {
            Some(m) if m.matched_terms == expected => {}
            Some(m) => panic!(
                "assert_terms! failed for {} {}:\n  expected: {:?}\n  actual:   {:?}",
                $ms, $nick, expected, m.matched_terms
            ),
            None => panic!(
                "assert_terms! failed: no mention {} {}.\n  Available: {:?}",
                $ms,
                $nick,
                mentions
                    .iter()
                    .map(|m| (m.timestamp.timestamp_millis(), m.nick.clone()))
                    .collect::<Vec<_>>()
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Card assertions
// ---------------------------------------------------------------------------

/// Assert the platform of every card, in order.
///
/// ```rust
/// assert_card_platforms!(cards, [Platform::YouTube, Platform::Other]);
/// ```
#[macro_export]
macro_rules! assert_card_platforms {
    ($cards:expr, [$($platform:expr),* $(,)?]) => {{
        let cards: &[linkwall_core::Card] = &$cards;
        let expected: Vec<linkwall_core::Platform> = vec![$($platform),*];
        let actual: Vec<linkwall_core::Platform> = cards.iter().map(|c| c.platform).collect();
        if actual != expected {
            panic!(
                "assert_card_platforms! failed:\n  expected: {:?}\n  actual:   {:?}\n  urls: {:?}",
                expected,
                actual,
                cards.iter().map(|c| c.url.as_str()).collect::<Vec<_>>()
            );
        }
    }};
}

/// Assert that no card in the list originates from `nick`.
#[macro_export]
macro_rules! assert_no_cards_from {
    ($cards:expr, $mentions:expr, $nick:expr) => {{
        let cards: &[linkwall_core::Card] = &$cards;
        let mentions: &[linkwall_core::Mention] = &$mentions;
        for card in cards {
            if let Some(m) = mentions.get(card.mention) {
                if m.nick.eq_ignore_ascii_case($nick) {
                    panic!(
                        "assert_no_cards_from! failed: card {:?} comes from {:?}",
                        card.id, m.nick
                    );
                }
            }
        }
    }};
}
