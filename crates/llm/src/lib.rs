//! Generation backend abstraction for Quill.
//!
//! The drafting workflow talks to an opaque chat-completion capability
//! through the [`TextGenerator`] trait; this crate provides the Ollama
//! implementation, an opt-in retry wrapper, and a config-driven
//! constructor.

pub mod config;
pub mod generator;
pub mod ollama;
pub mod retry;

pub use config::{build_generator, GeneratorConfig};
pub use generator::{ChatMessage, Role, TextGenerator};
pub use ollama::OllamaGenerator;
pub use retry::{RetryConfig, RetryingGenerator};
