//! PDF download
//!
//! Repository URLs are unreliable: landing pages served as text/html,
//! truncated files, oversized scans. Every download is validated by magic
//! bytes and capped in size before it reaches the PDF decoder. Transport
//! failures are surfaced as-is; retry policy belongs to the caller.

use regex::Regex;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ResolvedPdf;

/// Size cap for downloaded PDFs (20MB)
const MAX_PDF_BYTES: usize = 20 * 1024 * 1024;

/// Validate URL for document download
fn is_valid_download_url(url_str: &str) -> bool {
    let parsed = match url::Url::parse(url_str) {
        Ok(u) => u,
        Err(_) => return false,
    };

    // Must be http/https
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    // Check hostname
    if let Some(host) = parsed.host_str() {
        if host == "localhost" || host == "127.0.0.1" || !host.contains('.') {
            return false;
        }
    } else {
        return false;
    }
    true
}

/// Download a PDF from a URL
///
/// Redirects are followed (limit 5). The response must start with the PDF
/// magic bytes and stay under the size cap.
pub async fn download_pdf(url: &str, source: &str) -> Result<ResolvedPdf, String> {
    if !is_valid_download_url(url) {
        return Err(format!("Invalid download URL: {}", url));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("paperlens/0.3 (https://github.com/Ekats/paperlens)")
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    println!("[Download] Fetching {} PDF: {}", source, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to download PDF from {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(format!("URL {} returned status {}", url, response.status()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read PDF bytes: {}", e))?
        .to_vec();

    // Validate PDF magic bytes
    if bytes.len() < 4 || &bytes[0..4] != b"%PDF" {
        return Err(format!("URL {} did not return a valid PDF", url));
    }

    if bytes.len() > MAX_PDF_BYTES {
        return Err(format!(
            "PDF from {} too large: {} MB",
            url,
            bytes.len() / 1024 / 1024
        ));
    }

    println!("[Download]   {} KB", bytes.len() / 1024);

    Ok(ResolvedPdf {
        bytes,
        source: source.to_string(),
        url: url.to_string(),
    })
}

/// Build a filesystem-safe filename from a paper title
pub fn safe_filename(title: &str) -> String {
    let underscored = title.trim().replace(' ', "_");
    let sanitized = Regex::new(r"[^A-Za-z0-9_]")
        .unwrap()
        .replace_all(&underscored, "")
        .to_string();

    if sanitized.is_empty() {
        "paper".to_string()
    } else {
        sanitized
    }
}

/// Save downloaded PDF bytes under a sanitized title-derived name.
///
/// Returns the written path. The file is an artifact of retrieval, not of
/// the pipeline; nothing reads it back.
pub fn save_pdf(pdf: &ResolvedPdf, title: &str, dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create download directory: {}", e))?;

    let path = dir.join(format!("{}.pdf", safe_filename(title)));
    std::fs::write(&path, &pdf.bytes).map_err(|e| format!("Failed to write PDF: {}", e))?;

    println!("[Download]   Saved to {:?}", path);
    Ok(path)
}
