//! PDF text extraction wrapper
//!
//! Wraps the pdf-extract crate with error handling for:
//! - Encrypted PDFs
//! - Scanned/image-only PDFs
//! - Corrupted PDFs

/// Extract per-page plain text from PDF bytes, in page order.
///
/// Returns an error for corrupted or encrypted PDFs, and for documents with
/// no extractable text at all (scanned or image-only). Pages that decode to
/// pure whitespace are dropped; the remaining pages keep their relative
/// order.
pub fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<String>, String> {
    let raw_pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .map_err(|e| format!("Failed to extract PDF text: {}", e))?;

    let pages: Vec<String> = raw_pages
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect();

    if pages.is_empty() {
        return Err("PDF contains no extractable text (scanned or image-only?)".to_string());
    }

    println!("[Extract] {} pages with text", pages.len());
    Ok(pages)
}
