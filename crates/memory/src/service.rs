//! Vector memory as a retrieval oracle: index documents, recall snippets.

use std::path::Path;

use async_trait::async_trait;
use quill_common::{truncate_chars, QuillError, Result};
use quill_tools::{read_pdf, Recall, RecallHit, RECALL_SNIPPET_CHARS};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::embedding::Embedder;
use crate::store::VectorStore;

/// Pages of a PDF considered when indexing a folder.
const INDEX_PDF_MAX_PAGES: usize = 30;

pub struct MemoryService {
    embedder: Embedder,
    store: VectorStore,
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            embedder: Embedder::new(),
            store: VectorStore::new(),
        }
    }

    /// Load the embedding model. One-time cost; required before indexing
    /// or recall.
    pub fn initialize(&self) -> Result<()> {
        self.embedder.initialize()
    }

    pub async fn document_count(&self) -> usize {
        self.store.len().await
    }

    /// Embed and store one document under its source path.
    pub async fn remember(&self, path: impl Into<String>, text: &str) -> Result<()> {
        let embedding = self.embedder.embed(text).await?;
        self.store.add(path.into(), text, embedding).await;
        Ok(())
    }

    /// Walk a folder and index every `.pdf`, `.txt` and `.md` file found.
    /// Returns the number of documents indexed.
    pub async fn index_folder(&self, folder: &Path) -> Result<usize> {
        if !folder.is_dir() {
            return Err(QuillError::Memory(format!(
                "Index folder '{}' does not exist",
                folder.display()
            )));
        }

        let mut indexed = 0;
        for entry in WalkDir::new(folder).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(text) = extract_file_text(path) else {
                continue;
            };

            let key = path.display().to_string();
            debug!(path = %key, chars = text.len(), "Indexing document");
            self.remember(key, &text).await?;
            indexed += 1;
        }

        info!(folder = %folder.display(), indexed, "Folder indexed");
        Ok(indexed)
    }
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recall for MemoryService {
    async fn recall(&self, query: &str, k: usize) -> Result<Vec<RecallHit>> {
        let embedding = self.embedder.embed(query).await?;
        let matches = self.store.query(&embedding, k).await;

        Ok(matches
            .into_iter()
            .map(|m| RecallHit {
                path: m.path,
                text: truncate_chars(&m.text, RECALL_SNIPPET_CHARS),
            })
            .collect())
    }
}

/// Pull indexable text out of a file, by extension. `None` for unsupported
/// types, unreadable files and empty bodies.
fn extract_file_text(path: &Path) -> Option<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let text = match extension.as_str() {
        "pdf" => {
            let pages = read_pdf(&path.display().to_string(), INDEX_PDF_MAX_PAGES);
            // A lone page-0 entry is the extraction-failure sentinel.
            if pages.len() == 1 && pages[0].page == 0 {
                warn!(path = %path.display(), "Skipping unreadable PDF");
                return None;
            }
            pages
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        "txt" | "md" => std::fs::read_to_string(path).ok()?,
        _ => return None,
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extract_file_text_reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes\nSome content.").unwrap();

        let text = extract_file_text(&path).unwrap();
        assert!(text.contains("Some content."));
    }

    #[test]
    fn extract_file_text_skips_unsupported_and_empty() {
        let dir = tempfile::tempdir().unwrap();

        let image = dir.path().join("photo.png");
        fs::write(&image, [0u8; 8]).unwrap();
        assert!(extract_file_text(&image).is_none());

        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "   \n").unwrap();
        assert!(extract_file_text(&empty).is_none());
    }

    #[test]
    fn extract_file_text_skips_broken_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "not really a pdf").unwrap();

        assert!(extract_file_text(&path).is_none());
    }

    #[tokio::test]
    async fn recall_before_initialize_is_an_error() {
        let service = MemoryService::new();
        let err = service.recall("anything", 4).await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[tokio::test]
    async fn index_folder_requires_existing_directory() {
        let service = MemoryService::new();
        let err = service
            .index_folder(Path::new("/no/such/folder"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    // Downloads the embedding model; run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore = "Downloads model from network, slow"]
    async fn index_then_recall_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cats.md"), "Cats are small felines.").unwrap();
        fs::write(dir.path().join("rust.md"), "Rust is a systems language.").unwrap();

        let service = MemoryService::new();
        service.initialize().unwrap();
        let indexed = service.index_folder(dir.path()).await.unwrap();
        assert_eq!(indexed, 2);

        let hits = service.recall("feline pets", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].path.ends_with("cats.md"));
    }
}
