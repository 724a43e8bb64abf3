//! PDF text extraction via lopdf.

use lopdf::Document;
use tracing::debug;

use super::ExtractError;

/// Extracts text from a PDF, page by page, joining pages with a blank line.
/// The unit count is the document's actual page count.
pub fn extract_pdf(bytes: &[u8]) -> Result<(String, usize), ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::CorruptDocument(e.to_string()))?;

    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut text_parts: Vec<String> = Vec::new();
    for page_num in pages.keys() {
        // Pages with no extractable content (e.g. scanned images) are skipped.
        if let Ok(page_text) = doc.extract_text(&[*page_num]) {
            if !page_text.trim().is_empty() {
                text_parts.push(page_text.trim().to_string());
            }
        }
    }

    let full_text = text_parts.join("\n\n");
    if full_text.trim().is_empty() {
        return Err(ExtractError::NoExtractableText);
    }

    debug!(
        "extracted {} chars from PDF ({page_count} pages)",
        full_text.len()
    );
    Ok((full_text, page_count))
}
