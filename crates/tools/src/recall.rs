//! Retrieval-oracle seam for the `rag_recall` tool.

use async_trait::async_trait;
use quill_common::Result;
use serde::{Deserialize, Serialize};

/// Maximum snippet length returned per recall hit, in characters.
pub const RECALL_SNIPPET_CHARS: usize = 1200;

/// One ranked snippet from the memory collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallHit {
    pub path: String,
    pub text: String,
}

/// Query in, ranked text snippets out. Implemented by the vector memory
/// crate; the router only sees this seam.
#[async_trait]
pub trait Recall: Send + Sync {
    async fn recall(&self, query: &str, k: usize) -> Result<Vec<RecallHit>>;
}
