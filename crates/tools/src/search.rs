//! Keyed web search collaborator.

use std::time::Duration;

use quill_common::{QuillError, Result, SearchHit};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SEARCH_API_URL: &str = "https://api.tavily.com/search";
const SEARCH_TIMEOUT_MS: u64 = 60_000;

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Search client. Without an API key every query resolves to an empty hit
/// list; missing configuration is never an error.
pub struct SearchClient {
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl SearchClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_millis(SEARCH_TIMEOUT_MS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let Some(ref api_key) = self.api_key else {
            debug!("No search API key configured, returning no hits");
            return Ok(Vec::new());
        };

        let body = SearchRequest {
            api_key,
            query,
            max_results: k,
        };

        let response = self
            .http_client
            .post(SEARCH_API_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuillError::Tool(format!("Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QuillError::Tool(format!(
                "Search API error {status}: {body_text}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| QuillError::Tool(format!("Failed to parse search response: {e}")))?;

        let hits = parsed
            .results
            .into_iter()
            .map(|raw| SearchHit {
                title: raw.title.unwrap_or_default(),
                url: raw.url.unwrap_or_default(),
                snippet: raw.content.unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        debug!(query = %query, hits = hits.len(), "Search completed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_yields_empty_hits_not_error() {
        let client = SearchClient::new(None);
        let hits = client.search("carbon tax", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn empty_key_counts_as_unconfigured() {
        let client = SearchClient::new(Some(String::new()));
        assert!(!client.is_configured());
        assert!(client.search("anything", 5).await.unwrap().is_empty());
    }

    #[test]
    fn raw_hits_tolerate_missing_fields() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"results":[{"url":"https://a.example"}]}"#).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert!(parsed.results[0].title.is_none());
    }
}
