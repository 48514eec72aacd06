//! Paper lookup, PDF retrieval, and text extraction
//!
//! Boundary collaborators for the summarization pipeline:
//! 1. Lookup: Semantic Scholar title search (optional open-access PDF URL)
//! 2. Retrieval: HTTP download with PDF validation
//! 3. Decoding: pdf-extract text extraction, split into pages
//!
//! All three report failures as `Result<_, String>` at the boundary; the
//! pipeline converts them into its typed error taxonomy.

pub mod download;
pub mod pdf_extractor;
pub mod search;

/// Result of a successful paper lookup
#[derive(Debug, Clone)]
pub struct PaperRecord {
    /// Semantic Scholar paper id
    pub paper_id: String,
    /// Matched title as recorded by the index
    pub title: String,
    /// Direct PDF location, when one is known
    pub pdf_url: Option<String>,
    /// Where the PDF URL came from ("open_access", "arxiv")
    pub pdf_source: Option<String>,
}

/// Result of a successful PDF download
#[derive(Debug, Clone)]
pub struct ResolvedPdf {
    /// PDF bytes
    pub bytes: Vec<u8>,
    /// Source tag carried over from the lookup record
    pub source: String,
    /// Original URL where the PDF was downloaded from
    pub url: String,
}
