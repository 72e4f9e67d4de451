use anyhow::{Context, Result};
use std::path::Path;

/// Extract the text of every page, in page order.
///
/// Pages that fail to decode are skipped with a warning. A document that
/// yields no text at all is an error.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .with_context(|| format!("Failed to load PDF {}", path.display()))?;

    let pages = doc.get_pages();
    tracing::debug!(page_count = pages.len(), "Extracting text from PDF");

    let mut text = String::new();
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                tracing::warn!(page = page_num, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    if text.trim().is_empty() {
        anyhow::bail!("No text content extracted from {}", path.display());
    }
    Ok(text)
}

/// Whether `bytes` starts like a PDF file.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}
