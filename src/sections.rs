//! Section-relevant page selection for academic papers
//!
//! Papers are summarized from their abstract, introduction, and conclusion
//! pages rather than the full body. Classification uses marker substrings,
//! not AI, for speed and consistency; the markers are heuristic and make no
//! attempt to find every paper's true section boundaries.

/// Section classification for a single page of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSection {
    Abstract,     // Page mentions the abstract - include, keep scanning
    Introduction, // Page mentions the introduction - include, keep scanning
    Conclusion,   // Page mentions the conclusion - include, stop scanning
    Unclassified, // No marker - skip, keep scanning
}

impl PageSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSection::Abstract => "abstract",
            PageSection::Introduction => "introduction",
            PageSection::Conclusion => "conclusion",
            PageSection::Unclassified => "unclassified",
        }
    }
}

/// Classify a page by the first marker it contains.
///
/// Checks are case-insensitive and evaluated in fixed priority:
/// abstract > introduction > conclusion. A page containing several markers
/// is classified by the highest-priority one.
pub fn classify_page(page_text: &str) -> PageSection {
    let lower = page_text.to_lowercase();

    if lower.contains("abstract") {
        return PageSection::Abstract;
    }
    if lower.contains("introduction") {
        return PageSection::Introduction;
    }
    if lower.contains("conclusion") {
        return PageSection::Conclusion;
    }

    PageSection::Unclassified
}

/// Select the section-relevant pages and concatenate them in document order.
///
/// Abstract and introduction pages are appended and scanning continues; the
/// first conclusion page is appended and scanning stops there, treating it
/// as the document's final relevant page. Unclassified pages are skipped
/// without halting the scan. Each included page is prefixed with a newline,
/// and a page is included at most once.
///
/// Returns an empty string when no page matches any marker.
pub fn extract_sections(pages: &[String]) -> String {
    let mut text = String::new();

    for page in pages {
        match classify_page(page) {
            PageSection::Abstract | PageSection::Introduction => {
                text.push('\n');
                text.push_str(page);
            }
            PageSection::Conclusion => {
                text.push('\n');
                text.push_str(page);
                break;
            }
            PageSection::Unclassified => {}
        }
    }

    text
}
