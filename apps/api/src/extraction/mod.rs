//! PDF extraction collaborator: turns uploaded bytes into per-page text.
//!
//! `pdf-extract` is synchronous and CPU-bound, so parsing runs on the blocking
//! pool. Callers treat an `ExtractionError` as "this document has no text" and
//! keep going with the rest of the batch.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::document::Document;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("'{0}' is not a PDF file")]
    NotPdf(String),

    #[error("failed to parse '{document}': {message}")]
    Parse { document: String, message: String },

    #[error("extraction task for '{document}' failed: {message}")]
    Task { document: String, message: String },
}

/// Page-text extraction backend. Carried in `AppState` as `Arc<dyn PageExtractor>`.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, document_id: &str, bytes: Bytes) -> Result<Document, ExtractionError>;
}

/// `pdf-extract` backed extractor. Pages come back in reading order, numbered from 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageExtractor;

#[async_trait]
impl PageExtractor for PdfPageExtractor {
    async fn extract(&self, document_id: &str, bytes: Bytes) -> Result<Document, ExtractionError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ExtractionError::NotPdf(document_id.to_string()));
        }

        let size = bytes.len();
        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .await
            .map_err(|e| ExtractionError::Task {
                document: document_id.to_string(),
                message: e.to_string(),
            })?
            .map_err(|e| ExtractionError::Parse {
                document: document_id.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(document = document_id, bytes = size, pages = pages.len(), "Extracted PDF text");
        Ok(Document::from_page_texts(document_id, pages))
    }
}
