//! In-memory vector store with cosine ranking.

use tokio::sync::RwLock;
use tracing::debug;

struct StoredDocument {
    path: String,
    text: String,
    embedding: Vec<f32>,
}

/// One ranked match from a store query.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub score: f32,
    pub path: String,
    pub text: String,
}

/// Nearest-neighbor store keyed by source path. Adding a document under an
/// existing path replaces it.
pub struct VectorStore {
    documents: RwLock<Vec<StoredDocument>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    pub async fn add(&self, path: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) {
        let path = path.into();
        let mut documents = self.documents.write().await;
        documents.retain(|doc| doc.path != path);
        documents.push(StoredDocument {
            path,
            text: text.into(),
            embedding,
        });
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Rank all documents against the query embedding, best first.
    pub async fn query(&self, embedding: &[f32], k: usize) -> Vec<QueryMatch> {
        let documents = self.documents.read().await;

        let mut matches: Vec<QueryMatch> = documents
            .iter()
            .map(|doc| QueryMatch {
                score: cosine_similarity(embedding, &doc.embedding),
                path: doc.path.clone(),
                text: doc.text.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(k);

        debug!(matches = matches.len(), "Vector store query");
        matches
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_ranks_by_cosine_similarity() {
        let store = VectorStore::new();
        store.add("a.md", "close", vec![1.0, 0.0]).await;
        store.add("b.md", "far", vec![0.0, 1.0]).await;
        store.add("c.md", "middle", vec![1.0, 1.0]).await;

        let matches = store.query(&[1.0, 0.0], 3).await;
        assert_eq!(matches[0].path, "a.md");
        assert_eq!(matches[1].path, "c.md");
        assert_eq!(matches[2].path, "b.md");
    }

    #[tokio::test]
    async fn query_truncates_to_k() {
        let store = VectorStore::new();
        for i in 0..10 {
            store.add(format!("{i}.md"), "text", vec![1.0, 0.0]).await;
        }
        assert_eq!(store.query(&[1.0, 0.0], 4).await.len(), 4);
    }

    #[tokio::test]
    async fn add_replaces_same_path() {
        let store = VectorStore::new();
        store.add("a.md", "old", vec![1.0, 0.0]).await;
        store.add("a.md", "new", vec![1.0, 0.0]).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.query(&[1.0, 0.0], 1).await[0].text, "new");
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
