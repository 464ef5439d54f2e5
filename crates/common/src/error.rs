//! Error types for Quill.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuillError {
    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuillError>;
