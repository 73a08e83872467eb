//! Merge & dedup — folds pages of mentions into one ordered list.
//!
//! Mentions are keyed by `(timestamp, nick)`. On a collision the incoming
//! mention only contributes matched terms it does not already carry; every
//! other field keeps its first-written value. The result is sorted newest
//! first with a stable sort, so equal timestamps keep their prior order.
//!
//! Folding the same page twice is a no-op, and folding a page into an
//! accumulated list yields a superset of both.

use crate::types::{Mention, MentionKey};
use std::collections::HashMap;

/// Fold `incoming` into `acc`, then restore newest-first order.
///
/// Returns the number of mentions that were new to `acc`.
pub fn merge_into<I>(acc: &mut Vec<Mention>, incoming: I) -> usize
where
    I: IntoIterator<Item = Mention>,
{
    let mut index: HashMap<MentionKey, usize> = acc
        .iter()
        .enumerate()
        .map(|(i, m)| (m.key(), i))
        .collect();

    let before = acc.len();
    for mention in incoming {
        match index.get(&mention.key()) {
            Some(&i) => {
                let existing = &mut acc[i];
                for term in &mention.matched_terms {
                    existing.add_term(term);
                }
            }
            None => {
                index.insert(mention.key(), acc.len());
                acc.push(mention);
            }
        }
    }

    sort_newest_first(acc);
    acc.len() - before
}

/// Merge several result lists (one per term, or one fallback page) into a
/// fresh list. Lists are folded in the order given.
pub fn merge_lists<I, L>(lists: I) -> Vec<Mention>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Mention>,
{
    let mut acc = Vec::new();
    for list in lists {
        merge_into(&mut acc, list);
    }
    acc
}

fn sort_newest_first(mentions: &mut [Mention]) {
    // `sort_by` is stable: ties keep insertion order.
    mentions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
