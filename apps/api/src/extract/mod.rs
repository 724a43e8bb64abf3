//! Document Extractor — turns raw CV bytes into plain text plus a page count.

pub mod docx;
pub mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("invalid or corrupted document: {0}")]
    CorruptDocument(String),

    #[error("no text could be extracted from the document; it may be scanned or image-based")]
    NoExtractableText,
}

/// Extracts text from a CV document, dispatching on the filename extension.
///
/// Returns `(text, unit_count)` where `unit_count` is the true page count for
/// PDFs and a 500-words-per-page estimate for DOC/DOCX.
pub fn extract(bytes: &[u8], filename: &str) -> Result<(String, usize), ExtractError> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        pdf::extract_pdf(bytes)
    } else if lower.ends_with(".doc") || lower.ends_with(".docx") {
        docx::extract_docx(bytes)
    } else {
        let extension = lower.rsplit('.').next().unwrap_or("").to_string();
        Err(ExtractError::UnsupportedFormat(format!(".{extension}")))
    }
}
