//! Research record types and the size-bounded compaction projection.

use serde::{Deserialize, Serialize};

/// Maximum number of records kept by compaction.
pub const COMPACT_RECORD_LIMIT: usize = 20;

/// Maximum excerpt length per compact record, in characters.
pub const COMPACT_EXCERPT_CHARS: usize = 1200;

/// One ranked hit from the search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// One fetched source for a single (query, hit) pair.
///
/// Ephemeral: owned by the driver for the duration of one run, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchItem {
    pub query: String,
    pub title: String,
    pub url: String,
    pub text: String,
    pub snippet: String,
}

impl ResearchItem {
    pub fn from_hit(query: impl Into<String>, hit: SearchHit, text: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            title: hit.title,
            url: hit.url,
            text: text.into(),
            snippet: hit.snippet,
        }
    }
}

/// Size-bounded projection of a [`ResearchItem`] that fits the generation
/// backend's input budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactRecord {
    pub query: String,
    pub title: String,
    pub url: String,
    pub excerpt: String,
}

/// Project research items into compact records.
///
/// Takes the first `limit` items in their original order (order decides what
/// survives truncation), drops items without a URL, and caps each excerpt at
/// `max_excerpt` characters. The excerpt prefers fetched text over the search
/// snippet.
pub fn compact(items: &[ResearchItem], limit: usize, max_excerpt: usize) -> Vec<CompactRecord> {
    items
        .iter()
        .take(limit)
        .filter(|item| !item.url.is_empty())
        .map(|item| {
            let source = if item.text.is_empty() {
                &item.snippet
            } else {
                &item.text
            };
            CompactRecord {
                query: item.query.clone(),
                title: item.title.clone(),
                url: item.url.clone(),
                excerpt: truncate_chars(source, max_excerpt),
            }
        })
        .collect()
}

/// Compaction with the default limits.
pub fn compact_default(items: &[ResearchItem]) -> Vec<CompactRecord> {
    compact(items, COMPACT_RECORD_LIMIT, COMPACT_EXCERPT_CHARS)
}

/// Character-boundary-safe prefix truncation.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
