//! End-to-end research run: brief, outline, query extraction, search/fetch
//! fan-out, summaries, cited draft.

use std::io::BufRead;

use futures_util::{stream, StreamExt};
use quill_common::{compact_default, ResearchItem, Result};
use quill_tools::{PageFetcher, SearchClient};
use quill_workflow::{default_queries, extract_queries, DraftingPipeline, DraftingSession};
use tracing::{info, warn};

/// Hits requested per extracted query.
pub const HITS_PER_QUERY: usize = 6;

/// Concurrent fetches per query's hit list.
pub const FETCH_CONCURRENCY: usize = 4;

/// Everything a completed run produced.
pub struct ResearchReport {
    pub outline: String,
    pub queries: Vec<String>,
    pub summaries: String,
    pub draft: String,
}

pub struct ResearchDriver {
    session: DraftingSession,
    search: SearchClient,
    fetcher: PageFetcher,
}

impl ResearchDriver {
    pub fn new(pipeline: DraftingPipeline, search: SearchClient) -> Self {
        Self {
            session: DraftingSession::new(pipeline),
            search,
            fetcher: PageFetcher::new(),
        }
    }

    /// Run the full pipeline, printing each stage's output as it completes
    /// so partial progress stays visible if a later stage fails.
    pub async fn run(&mut self, brief: &str) -> Result<ResearchReport> {
        let outline = self.session.outline(brief).await?;
        println!("\n=== (1)-(2)-(3): Refined question, Outline, Search queries ===\n");
        println!("{outline}");

        let mut queries = extract_queries(&outline);
        if queries.is_empty() {
            info!("No queries extracted from outline, substituting defaults");
            queries = default_queries(brief);
        }
        println!("\n[INFO] Web queries: {queries:?}");

        let items = self.gather(&queries).await;
        let records = compact_default(&items);
        let compact_json = serde_json::to_string(&records)?;

        let summaries = self.session.summarize(brief, &compact_json).await?;
        println!("\n=== (4): Source summaries (with links/DOIs) ===\n");
        println!("{summaries}");

        let draft = self.session.draft(brief, &outline, &summaries).await?;
        println!("\n=== (5)-(6)-(7): Draft, Provisional bibliography, Limitations & Next Checks ===\n");
        println!("{draft}");

        Ok(ResearchReport {
            outline,
            queries,
            summaries,
            draft,
        })
    }

    /// Search-then-fetch fan-out. Fetches within a query run concurrently in
    /// a bounded pool; aggregation preserves (query order, hit order), which
    /// matters because compaction truncates at a fixed record limit.
    async fn gather(&self, queries: &[String]) -> Vec<ResearchItem> {
        let mut items = Vec::new();

        for query in queries {
            let hits = match self.search.search(query, HITS_PER_QUERY).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(query = %query, error = %e, "Search failed, skipping query");
                    continue;
                }
            };

            info!(query = %query, hits = hits.len(), "Fetching sources");

            let fetched: Vec<ResearchItem> = stream::iter(hits.into_iter().map(|hit| {
                let query = query.clone();
                async move {
                    let text = self.fetcher.fetch_clean(&hit.url).await;
                    ResearchItem::from_hit(query, hit, text)
                }
            }))
            .buffered(FETCH_CONCURRENCY)
            .collect()
            .await;

            items.extend(fetched);
        }

        items
    }
}

/// Read a blank-line-terminated brief from a reader.
pub fn read_brief(reader: impl BufRead) -> std::io::Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n").trim().to_string())
}
