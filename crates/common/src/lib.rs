//! Common types shared across Quill crates.
//!
//! This crate provides the error type and the research record model that
//! the tool router, the drafting workflow, and the driver exchange.

pub mod error;
pub mod research;

pub use error::{QuillError, Result};
pub use research::{
    compact, compact_default, truncate_chars, CompactRecord, ResearchItem, SearchHit,
    COMPACT_EXCERPT_CHARS, COMPACT_RECORD_LIMIT,
};
