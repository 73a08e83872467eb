//! Source orchestration — one page of mentions for a term set.
//!
//! An initial fetch queries the primary source once per unique term,
//! concurrently, and merges the results. A term whose query fails contributes
//! nothing and is only logged. If the merged primary result is empty, the
//! fallback search is asked exactly once with the whole term set, and the
//! source that served the initial page keeps serving every later page (the
//! cursor variant of the returned page encodes which one that is).
//!
//! The orchestrator holds no per-feed state; the fetch guard and the cursor
//! live in [`crate::feed::Feed`].

use crate::error::FeedError;
use crate::source::{FallbackSearch, PrimaryQuery};
use futures::future::join_all;
use linkwall_core::merge::merge_lists;
use linkwall_core::{Mention, PaginationCursor, SourceKind};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Initial,
    AppendMore,
}

/// One fetched page, already merged and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub mentions: Vec<Mention>,
    pub next_cursor: Option<PaginationCursor>,
    pub has_more: bool,
    pub source: SourceKind,
}

impl Page {
    fn exhausted(source: SourceKind) -> Self {
        Self { mentions: Vec::new(), next_cursor: None, has_more: false, source }
    }
}

/// Trim, drop empties and drop case-insensitive duplicates, keeping the
/// first spelling of each term.
pub fn dedupe_terms(terms: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Terms a fallback result matches (substring of text or nick). A result
/// matching none of them is attributed to the whole set.
pub fn attribute_terms(mention: &Mention, terms: &[String]) -> Vec<String> {
    let text = mention.text.to_lowercase();
    let nick = mention.nick.to_lowercase();
    let matched: Vec<String> = terms
        .iter()
        .filter(|t| {
            let t = t.to_lowercase();
            text.contains(&t) || nick.contains(&t)
        })
        .cloned()
        .collect();
    if matched.is_empty() {
        terms.to_vec()
    } else {
        matched
    }
}

pub struct Orchestrator {
    primary: Arc<dyn PrimaryQuery>,
    fallback: Arc<dyn FallbackSearch>,
    page_size: usize,
}

impl Orchestrator {
    pub fn new(
        primary: Arc<dyn PrimaryQuery>,
        fallback: Arc<dyn FallbackSearch>,
        page_size: usize,
    ) -> Self {
        Self { primary, fallback, page_size: page_size.max(1) }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch one page. `cursor` is ignored for [`FetchMode::Initial`]; for
    /// [`FetchMode::AppendMore`] its variant selects the source.
    pub async fn fetch(
        &self,
        terms: &[String],
        cursor: Option<&PaginationCursor>,
        mode: FetchMode,
    ) -> Result<Page, FeedError> {
        let terms = dedupe_terms(terms);
        if terms.is_empty() {
            return Ok(Page::exhausted(SourceKind::Primary));
        }

        match mode {
            FetchMode::Initial => {
                let page = self.primary_page(&terms, 0).await;
                if !page.mentions.is_empty() {
                    tracing::info!(mentions = page.mentions.len(), "serving feed from primary source");
                    return Ok(page);
                }
                tracing::info!(terms = ?terms, "primary source empty, switching to fallback");
                self.fallback_page(&terms, None).await
            }
            FetchMode::AppendMore => match cursor {
                Some(PaginationCursor::Offset(offset)) => Ok(self.primary_page(&terms, *offset).await),
                Some(PaginationCursor::ContinuationToken(token)) => {
                    self.fallback_page(&terms, Some(token)).await
                }
                None => Ok(Page::exhausted(SourceKind::Primary)),
            },
        }
    }

    async fn primary_page(&self, terms: &[String], offset: usize) -> Page {
        let requests = terms.iter().map(|term| async move {
            match self.primary.query(term, self.page_size, offset).await {
                Ok(mut mentions) => {
                    for m in &mut mentions {
                        m.add_term(term);
                    }
                    mentions
                }
                Err(e) => {
                    tracing::warn!(term = %term, offset, error = %e, "primary query failed, skipping term");
                    Vec::new()
                }
            }
        });
        let per_term = join_all(requests).await;

        let has_more = per_term.iter().any(|list| list.len() >= self.page_size);
        Page {
            mentions: merge_lists(per_term),
            next_cursor: Some(PaginationCursor::Offset(offset + self.page_size)),
            has_more,
            source: SourceKind::Primary,
        }
    }

    async fn fallback_page(&self, terms: &[String], token: Option<&str>) -> Result<Page, FeedError> {
        let page = self
            .fallback
            .search(terms, token, self.page_size)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "fallback search failed");
                FeedError::Fallback(e.to_string())
            })?;

        if let Some(limit) = page.rate_limit {
            tracing::warn!(retry_after_secs = limit.retry_after_secs, "fallback search rate limited");
            return Err(FeedError::RateLimited {
                retry_after_secs: limit.retry_after_secs,
                retry_at: limit.retry_at,
            });
        }

        if page.mentions.is_empty() {
            return Ok(Page::exhausted(SourceKind::Fallback));
        }

        let mentions = page.mentions.into_iter().map(|mut m| {
            for term in attribute_terms(&m, terms) {
                m.add_term(&term);
            }
            m
        });
        let next_cursor = page.next_token.map(PaginationCursor::ContinuationToken);
        Ok(Page {
            mentions: merge_lists([mentions]),
            has_more: page.has_more && next_cursor.is_some(),
            next_cursor,
            source: SourceKind::Fallback,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dedupe_trims_and_ignores_case() {
        assert_eq!(
            dedupe_terms(&terms(&[" Rust", "rust ", "", "Tokio", "RUST"])),
            terms(&["Rust", "Tokio"])
        );
    }

    #[test]
    fn attribution_prefers_matching_terms() {
        let m = Mention::new(Utc.timestamp_millis_opt(1).unwrap(), "ferris", "love TOKIO");
        assert_eq!(attribute_terms(&m, &terms(&["rust", "tokio"])), terms(&["tokio"]));
        assert_eq!(attribute_terms(&m, &terms(&["ferr"])), terms(&["ferr"]));
        assert_eq!(attribute_terms(&m, &terms(&["a1", "b2"])), terms(&["a1", "b2"]));
    }
}
