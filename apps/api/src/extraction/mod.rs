//! Document extraction: turns an uploaded document into a `TextDocument`.
//!
//! `AppState` holds an `Arc<dyn DocumentExtractor>`; the default backend reads
//! the text layer of a PDF with `pdf-extract`.

pub mod handlers;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::matching::document::TextDocument;
use crate::matching::error::MatchError;

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<TextDocument, MatchError>;
}

/// Text-layer PDF extraction. Scanned PDFs without a text layer fail with
/// `ExtractionFailed`.
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<TextDocument, MatchError> {
        // pdf-extract is CPU-bound and may panic on malformed input.
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| MatchError::ExtractionFailed(format!("PDF parser aborted: {e}")))?
            .map_err(|e| MatchError::ExtractionFailed(format!("{e:?}")))?;

        debug!(chars = text.len(), "Extracted PDF text");
        document_from_text(text)
    }
}

/// Wraps extracted text, rejecting documents with no text content.
pub fn document_from_text(text: String) -> Result<TextDocument, MatchError> {
    if text.trim().is_empty() {
        return Err(MatchError::ExtractionFailed(
            "No text content found in PDF".to_string(),
        ));
    }
    Ok(TextDocument::new(text))
}
