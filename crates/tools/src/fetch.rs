//! Page fetch and readability-style cleanup.
//!
//! Failures are encoded as sentinel-string payloads at the public boundary
//! so text-based consumers can surface them to a reader; internally the
//! fetch path is an ordinary `Result`.

use std::sync::LazyLock;
use std::time::Duration;

use quill_common::{truncate_chars, QuillError, Result};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

/// Maximum cleaned-text length per fetched page, in characters.
pub const FETCH_MAX_CHARS: usize = 20_000;

const FETCH_TIMEOUT_MS: u64 = 60_000;
const USER_AGENT: &str = "Mozilla/5.0";
const TEXT_WIDTH: usize = 100;

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

pub struct PageFetcher {
    http_client: reqwest::Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Fetch a URL and return cleaned text. Any failure comes back as an
    /// `[ERROR fetching <url>: ...]` payload, never as an error: fetch
    /// failures are data for downstream stages to reason about.
    pub async fn fetch_clean(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(text) => text,
            Err(e) => format!("[ERROR fetching {url}: {e}]"),
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| QuillError::Tool(e.to_string()))?
            .error_for_status()
            .map_err(|e| QuillError::Tool(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| QuillError::Tool(e.to_string()))?;

        let text = if content_type.contains("text/html") {
            extract_readable(&body)
        } else {
            body
        };

        let text = collapse_blank_lines(&text);
        debug!(url = %url, chars = text.len(), "Fetched and cleaned page");
        Ok(truncate_chars(&text, FETCH_MAX_CHARS))
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the main content out of an HTML document: prefer `<article>`, then
/// `<main>`, then the whole `<body>`.
fn extract_readable(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in ["article", "main", "body"] {
        let sel = Selector::parse(selector).unwrap();
        if let Some(element) = document.select(&sel).next() {
            return html2text::from_read(element.html().as_bytes(), TEXT_WIDTH);
        }
    }

    html2text::from_read(html.as_bytes(), TEXT_WIDTH)
}

fn collapse_blank_lines(text: &str) -> String {
    EXCESS_BLANK_LINES.replace_all(text, "\n\n").into_owned()
}
