//! Page-wise PDF text extraction.

use quill_common::{QuillError, Result};
use serde::{Deserialize, Serialize};

/// Text extracted from one PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfPage {
    pub page: u32,
    pub text: String,
}

/// Read up to `max_pages` pages of text from a PDF.
///
/// On failure the result is a single page-0 entry carrying an
/// `[ERROR reading PDF: ...]` payload, matching the fetch collaborator's
/// sentinel convention.
pub fn read_pdf(path: &str, max_pages: usize) -> Vec<PdfPage> {
    match extract_pages(path, max_pages) {
        Ok(pages) => pages,
        Err(e) => vec![PdfPage {
            page: 0,
            text: format!("[ERROR reading PDF: {e}]"),
        }],
    }
}

fn extract_pages(path: &str, max_pages: usize) -> Result<Vec<PdfPage>> {
    let document =
        lopdf::Document::load(path).map_err(|e| QuillError::Tool(e.to_string()))?;

    let pages = document
        .get_pages()
        .keys()
        .take(max_pages)
        .map(|&number| PdfPage {
            page: number,
            // A page that fails text extraction still counts, with empty text.
            text: document.extract_text(&[number]).unwrap_or_default(),
        })
        .collect();

    Ok(pages)
}
