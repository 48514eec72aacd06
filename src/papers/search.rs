//! Semantic Scholar paper lookup
//!
//! API Documentation: https://api.semanticscholar.org/api-docs/graph
//! Rate limit: shared public pool without a key, 1 request/second with one
//! API key: optional ("x-api-key" header)

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::PaperRecord;
use crate::settings;

const FIELDS: &str = "title,openAccessPdf,externalIds";

/// Semantic Scholar Graph API client
pub struct PaperSearchClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Response from the paper search endpoint
#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    total: Option<u64>,
    data: Option<Vec<RawPaper>>,
}

/// Raw paper structure from the API
#[derive(Debug, Deserialize)]
struct RawPaper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(rename = "openAccessPdf")]
    open_access_pdf: Option<RawOpenAccessPdf>,
    #[serde(rename = "externalIds")]
    external_ids: Option<RawExternalIds>,
}

#[derive(Debug, Deserialize)]
struct RawOpenAccessPdf {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExternalIds {
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
}

impl PaperSearchClient {
    /// Create a new client (public API, shared rate limits)
    pub fn new() -> Self {
        Self::new_with_key(None)
    }

    /// Create a new client with an optional API key for higher rate limits
    pub fn new_with_key(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("paperlens/0.3 (https://github.com/Ekats/paperlens)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: "https://api.semanticscholar.org/graph/v1/paper/search".to_string(),
            api_key,
        }
    }

    /// Create a client using the stored API key, if any
    pub fn from_settings() -> Self {
        Self::new_with_key(settings::get_semantic_scholar_api_key())
    }

    /// Look up the single best title match.
    ///
    /// Returns `Ok(None)` when the index has no match for the title; the
    /// record's `pdf_url` may still be `None` when a paper is known but has
    /// no retrievable source.
    pub async fn find_by_title(&self, title: &str) -> Result<Option<PaperRecord>, String> {
        let url = format!(
            "{}?query={}&fields={}&limit=1",
            self.base_url,
            urlencoding::encode(title),
            FIELDS
        );

        println!("[Lookup] Searching: \"{}\"", title);

        let mut request = self.client.get(&url).header("Accept", "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("API error {}: {}", status, body));
        }

        let api_response: RawSearchResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        let record = api_response
            .data
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(parse_record);

        match &record {
            Some(r) => println!(
                "[Lookup]   Matched \"{}\" (pdf: {})",
                r.title,
                r.pdf_source.as_deref().unwrap_or("none")
            ),
            None => println!(
                "[Lookup]   No match ({} candidates)",
                api_response.total.unwrap_or(0)
            ),
        }

        Ok(record)
    }
}

impl Default for PaperSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a raw API paper into a lookup record.
///
/// Prefers the index's open-access PDF URL; falls back to the arXiv PDF
/// endpoint when only an arXiv id is known.
fn parse_record(raw: RawPaper) -> Option<PaperRecord> {
    let title = raw.title?;
    let paper_id = raw.paper_id.unwrap_or_default();

    let open_access_url = raw.open_access_pdf.and_then(|p| p.url);
    let arxiv_url = raw
        .external_ids
        .and_then(|ids| ids.arxiv)
        .map(|id| format!("https://arxiv.org/pdf/{}.pdf", id));

    let (pdf_url, pdf_source) = match (open_access_url, arxiv_url) {
        (Some(url), _) => (Some(url), Some("open_access".to_string())),
        (None, Some(url)) => (Some(url), Some("arxiv".to_string())),
        (None, None) => (None, None),
    };

    Some(PaperRecord {
        paper_id,
        title,
        pdf_url,
        pdf_source,
    })
}
