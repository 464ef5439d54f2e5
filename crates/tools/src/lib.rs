//! Bounded capabilities and the tool router.
//!
//! The router translates a possibly-malformed text blob into a validated
//! invocation of one of six known tools and dispatches it to the matching
//! collaborator. System-affecting actions are never executed here; the
//! shell tool only returns a confirmation-required payload.

pub mod fetch;
pub mod pdf;
pub mod recall;
pub mod router;
pub mod schedule;
pub mod search;

pub use fetch::{PageFetcher, FETCH_MAX_CHARS};
pub use pdf::{read_pdf, PdfPage};
pub use recall::{Recall, RecallHit, RECALL_SNIPPET_CHARS};
pub use router::{
    parse_candidate, RouteError, ToolRequest, ToolResult, Toolbox, ALLOWED_COMMANDS,
};
pub use schedule::Scheduler;
pub use search::SearchClient;
