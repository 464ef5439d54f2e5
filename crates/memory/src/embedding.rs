//! Text embedding behind an explicit handle.
//!
//! The embedder is constructed once at process start and passed to whoever
//! needs it; loading the model is an explicit [`Embedder::initialize`] call
//! with a documented one-time cost (the model is downloaded on the first
//! ever run), not an implicit side effect of the first embed.

use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;
use quill_common::{QuillError, Result};
use tokio::task;
use tracing::{debug, info};

pub struct Embedder {
    model_name: EmbeddingModel,
    model: OnceCell<Arc<TextEmbedding>>,
}

impl Embedder {
    /// An embedder over all-MiniLM-L6-v2 (384 dimensions).
    pub fn new() -> Self {
        Self {
            model_name: EmbeddingModel::AllMiniLML6V2,
            model: OnceCell::new(),
        }
    }

    /// Load the embedding model. Must be called before [`Embedder::embed`].
    pub fn initialize(&self) -> Result<()> {
        self.model.get_or_try_init(|| {
            info!(model = ?self.model_name, "Initializing embedding model");
            let model = TextEmbedding::try_new(InitOptions::new(self.model_name.clone()))
                .map_err(|e| {
                    QuillError::Memory(format!("Failed to initialize embedding model: {e}"))
                })?;
            Ok::<_, QuillError>(Arc::new(model))
        })?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.model.get().is_some()
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.model.get().cloned().ok_or_else(|| {
            QuillError::Memory("Embedder not initialized; call initialize() first".into())
        })?;

        let text = text.to_string();
        // fastembed is synchronous; keep it off the async workers.
        let mut embeddings = task::spawn_blocking(move || {
            model
                .embed(vec![text], None)
                .map_err(|e| QuillError::Memory(e.to_string()))
        })
        .await
        .map_err(|e| QuillError::Memory(format!("Embedding task failed: {e}")))??;

        debug!(
            dimension = embeddings.first().map(|e| e.len()).unwrap_or(0),
            "Generated embedding"
        );

        embeddings
            .pop()
            .ok_or_else(|| QuillError::Memory("Empty embedding result".into()))
    }
}

impl Default for Embedder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embed_before_initialize_is_an_error() {
        let embedder = Embedder::new();
        assert!(!embedder.is_initialized());

        let err = embedder.embed("hello").await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    // Downloads the model; run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore = "Downloads model from network, slow"]
    async fn embed_after_initialize_produces_vector() {
        let embedder = Embedder::new();
        embedder.initialize().unwrap();

        let embedding = embedder.embed("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().any(|&x| x != 0.0));
    }
}
