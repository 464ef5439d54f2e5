//! Vector memory for Quill.
//!
//! Used strictly as a retrieval oracle: documents go in once via indexing,
//! and recall returns ranked text snippets. Implements the router's
//! [`Recall`](quill_tools::Recall) seam.

pub mod embedding;
pub mod service;
pub mod store;

pub use embedding::Embedder;
pub use service::MemoryService;
pub use store::{QueryMatch, VectorStore};
