//! The drafting workflow for Quill.
//!
//! Turns a user brief into a refined question and outline, grounded source
//! summaries, and a cited draft with uncertainty markers, through a fixed
//! four-stage protocol over an opaque generation backend.

pub mod marks;
pub mod pipeline;
pub mod policy;
pub mod queries;

pub use marks::{enforce_marks, CITE_MARK, VERIFY_MARK};
pub use pipeline::{
    DraftingPipeline, DraftingSession, Stage, DEFAULT_TEMPERATURE, INTAKE_PROMPT,
    SUMMARIZE_INPUT_CAP,
};
pub use policy::Policy;
pub use queries::{default_queries, extract_queries, DEFAULT_QUERY_COUNT, MAX_QUERIES};
