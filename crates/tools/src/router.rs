//! Tool routing: parse a candidate request out of free text, validate it
//! against the closed tool set, and dispatch with argument defaults.
//!
//! The router never performs a system-affecting action itself. Allowed
//! shell commands come back tagged `[CONFIRM_REQUIRED]` for a human to act
//! on; everything else delegates to a collaborator.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::fetch::PageFetcher;
use crate::pdf::read_pdf;
use crate::recall::Recall;
use crate::schedule::Scheduler;
use crate::search::SearchClient;

/// Commands the shell tool will pass through for confirmation. Expand with
/// care.
pub const ALLOWED_COMMANDS: &[&str] = &["dir", "type", "echo", "ipconfig"];

/// Routing-level failures. Always recovered into a [`ToolResult`]; never
/// propagated as errors past the router.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown tool")]
    UnknownTool,
    #[error("Missing command")]
    MissingCommand,
    #[error("Command not allowed")]
    CommandNotAllowed,
}

/// A validated invocation of one of the six known tools.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    WebSearch { q: String, k: usize },
    WebFetch { url: String },
    ReadPdf { path: String, max_pages: usize },
    RagRecall { query: String, k: usize },
    Schedule { title: String, note: String, when: String },
    Shell { command: String },
}

#[derive(Deserialize, Default)]
struct SearchArgs {
    #[serde(default)]
    q: String,
    #[serde(default = "default_search_k")]
    k: usize,
}

#[derive(Deserialize, Default)]
struct FetchArgs {
    #[serde(default)]
    url: String,
}

#[derive(Deserialize, Default)]
struct PdfArgs {
    #[serde(default)]
    path: String,
    #[serde(default = "default_max_pages")]
    max_pages: usize,
}

#[derive(Deserialize, Default)]
struct RecallArgs {
    #[serde(default)]
    query: String,
    #[serde(default = "default_recall_k")]
    k: usize,
}

#[derive(Deserialize)]
struct ScheduleArgs {
    #[serde(default = "default_job_title")]
    title: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    when: String,
}

impl Default for ScheduleArgs {
    fn default() -> Self {
        Self {
            title: default_job_title(),
            note: String::new(),
            when: String::new(),
        }
    }
}

#[derive(Deserialize, Default)]
struct ShellArgs {
    #[serde(default)]
    command: String,
}

fn default_search_k() -> usize {
    5
}

fn default_recall_k() -> usize {
    4
}

fn default_max_pages() -> usize {
    10
}

fn default_job_title() -> String {
    "Task".into()
}

impl ToolRequest {
    /// Interpret a parsed candidate object. The only failure mode is a tool
    /// name outside the closed set; malformed arguments fall back to their
    /// per-field defaults.
    pub fn from_value(value: &Value) -> Result<Self, RouteError> {
        let tool = value.get("tool").and_then(Value::as_str).unwrap_or("");
        let args = value.get("args").cloned().unwrap_or_else(|| json!({}));

        let request = match tool {
            "web_search" => {
                let args: SearchArgs = parse_args(args);
                Self::WebSearch { q: args.q, k: args.k }
            }
            "web_fetch" => {
                let args: FetchArgs = parse_args(args);
                Self::WebFetch { url: args.url }
            }
            "read_pdf" => {
                let args: PdfArgs = parse_args(args);
                Self::ReadPdf {
                    path: args.path,
                    max_pages: args.max_pages,
                }
            }
            "rag_recall" => {
                let args: RecallArgs = parse_args(args);
                Self::RagRecall {
                    query: args.query,
                    k: args.k,
                }
            }
            "schedule" => {
                let args: ScheduleArgs = parse_args(args);
                Self::Schedule {
                    title: args.title,
                    note: args.note,
                    when: args.when,
                }
            }
            "shell" => {
                let args: ShellArgs = parse_args(args);
                Self::Shell {
                    command: args.command,
                }
            }
            _ => return Err(RouteError::UnknownTool),
        };

        Ok(request)
    }
}

fn parse_args<T: serde::de::DeserializeOwned + Default>(args: Value) -> T {
    serde_json::from_value(args).unwrap_or_default()
}

/// Dispatch outcome. `ok` is the single source of truth; `result` and
/// `error` are never both populated.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

impl From<RouteError> for ToolResult {
    fn from(error: RouteError) -> Self {
        Self::failure(error.to_string())
    }
}

/// Fast pre-filter, not a schema validator: the trimmed text must be a
/// single top-level JSON object and parse cleanly; anything else is `None`.
pub fn parse_candidate(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// The fixed capability set behind the router.
pub struct Toolbox {
    search: SearchClient,
    fetcher: PageFetcher,
    scheduler: Scheduler,
    recall: Arc<dyn Recall>,
}

impl Toolbox {
    pub fn new(
        search: SearchClient,
        fetcher: PageFetcher,
        scheduler: Scheduler,
        recall: Arc<dyn Recall>,
    ) -> Self {
        Self {
            search,
            fetcher,
            scheduler,
            recall,
        }
    }

    /// Route a free-text blob end to end: `None` when no candidate object is
    /// present, otherwise the dispatch outcome.
    pub async fn route(&self, text: &str) -> Option<ToolResult> {
        let value = parse_candidate(text)?;
        Some(self.dispatch_value(&value).await)
    }

    pub async fn dispatch_value(&self, value: &Value) -> ToolResult {
        match ToolRequest::from_value(value) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => e.into(),
        }
    }

    pub async fn dispatch(&self, request: ToolRequest) -> ToolResult {
        debug!(request = ?request, "Dispatching tool request");

        match request {
            ToolRequest::WebSearch { q, k } => match self.search.search(&q, k).await {
                Ok(hits) => ToolResult::success(json!(hits)),
                Err(e) => ToolResult::failure(e.to_string()),
            },
            // Fetch failures are data, not control flow: the collaborator
            // encodes them as sentinel payloads, so this arm is always ok.
            ToolRequest::WebFetch { url } => {
                ToolResult::success(Value::String(self.fetcher.fetch_clean(&url).await))
            }
            ToolRequest::ReadPdf { path, max_pages } => {
                ToolResult::success(json!(read_pdf(&path, max_pages)))
            }
            ToolRequest::RagRecall { query, k } => match self.recall.recall(&query, k).await {
                Ok(hits) => ToolResult::success(json!(hits)),
                Err(e) => ToolResult::failure(e.to_string()),
            },
            ToolRequest::Schedule { title, note, when } => ToolResult::success(Value::String(
                self.scheduler.submit(&title, &note, &when),
            )),
            ToolRequest::Shell { command } => match gate_shell(&command) {
                Ok(confirmation) => ToolResult::success(Value::String(confirmation)),
                Err(e) => e.into(),
            },
        }
    }
}

/// The router is an advisor, not an executor: an allowed command comes back
/// tagged for confirmation and is never run here.
fn gate_shell(command: &str) -> Result<String, RouteError> {
    if command.is_empty() {
        return Err(RouteError::MissingCommand);
    }

    let tokens = match shlex::split(command) {
        Some(tokens) if !tokens.is_empty() => tokens,
        _ => return Err(RouteError::MissingCommand),
    };

    let executable = tokens[0].to_lowercase();
    if !ALLOWED_COMMANDS.contains(&executable.as_str()) {
        return Err(RouteError::CommandNotAllowed);
    }

    Ok(format!("[CONFIRM_REQUIRED] {command}"))
}
