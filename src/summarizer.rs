//! Hosted summarization capability
//!
//! Wraps the Hugging Face Inference API for length-bounded, deterministic
//! text condensation. The capability is stateless per call and expensive to
//! reach, so a client is constructed once and injected into the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::settings;

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Length bounds for a single summarization call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub max_length: u32,
    pub min_length: u32,
}

impl SummaryBounds {
    /// Derive bounds from a chunk's word count.
    ///
    /// `max_length = min(130, word_count / 2)` keeps the requested output
    /// shorter than the input; `min_length = max(30, max_length / 4)` keeps
    /// the summary non-trivial. Returns `None` when the bounds would invert
    /// (chunks under 60 words drive `max_length` below the 30-word floor);
    /// callers pass such chunks through verbatim, since invoking the model
    /// with inverted bounds is undefined behavior.
    pub fn for_input_words(word_count: usize) -> Option<Self> {
        let max_length = (word_count / 2).min(130) as u32;
        let min_length = (max_length / 4).max(30);

        if max_length < min_length {
            return None;
        }

        Some(Self {
            max_length,
            min_length,
        })
    }
}

/// A text condensation capability bounded by length parameters.
///
/// One call summarizes one chunk with deterministic (non-sampled) decoding.
/// The pipeline serializes calls, so implementations need no locking beyond
/// `Send + Sync`.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String, String>;
}

/// Inference API request format
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

/// Inference API response format (array with one entry per input)
#[derive(Debug, Deserialize)]
struct InferenceSummary {
    summary_text: String,
}

/// Summarizer backed by the Hugging Face Inference API
pub struct HfSummarizer {
    client: reqwest::blocking::Client,
    model: String,
    api_key: String,
}

impl HfSummarizer {
    /// Create a client for the given model
    pub fn new(model: String, api_key: String) -> Result<Self, String> {
        // Blocking reqwest: summarization runs in a sync context and the
        // hosted model can take a while on a cold start
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            model,
            api_key,
        })
    }

    /// Create a client from stored settings (model id + API token)
    pub fn from_settings() -> Result<Self, String> {
        let api_key = settings::get_hf_api_key().ok_or("HF_API_TOKEN not set")?;
        Self::new(settings::get_summarization_model(), api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Summarizer for HfSummarizer {
    fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String, String> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                max_length: bounds.max_length,
                min_length: bounds.min_length,
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let url = format!("{}/{}", INFERENCE_BASE_URL, self.model);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(format!("Inference API error {}: {}", status, body));
        }

        let summaries: Vec<InferenceSummary> = response
            .json()
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| "Inference API returned no summary".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_tiny_chunk_passes_through() {
        // One word drives max_length to 0
        assert_eq!(SummaryBounds::for_input_words(1), None);
        assert_eq!(SummaryBounds::for_input_words(0), None);
    }

    #[test]
    fn test_bounds_invert_below_sixty_words() {
        // 59 words -> max_length 29, below the 30-word min_length floor
        assert_eq!(SummaryBounds::for_input_words(59), None);
        assert_eq!(
            SummaryBounds::for_input_words(60),
            Some(SummaryBounds {
                max_length: 30,
                min_length: 30,
            })
        );
    }

    #[test]
    fn test_bounds_cap_at_130() {
        assert_eq!(
            SummaryBounds::for_input_words(260),
            Some(SummaryBounds {
                max_length: 130,
                min_length: 32,
            })
        );
        assert_eq!(
            SummaryBounds::for_input_words(261),
            Some(SummaryBounds {
                max_length: 130,
                min_length: 32,
            })
        );
    }

    #[test]
    fn test_bounds_midrange() {
        // 100 words -> max 50, min floor 30
        assert_eq!(
            SummaryBounds::for_input_words(100),
            Some(SummaryBounds {
                max_length: 50,
                min_length: 30,
            })
        );
    }

    #[test]
    fn test_request_serialization_disables_sampling() {
        let request = InferenceRequest {
            inputs: "some text",
            parameters: InferenceParameters {
                max_length: 50,
                min_length: 30,
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parameters"]["do_sample"], serde_json::json!(false));
        assert_eq!(json["parameters"]["max_length"], serde_json::json!(50));
        assert_eq!(json["inputs"], serde_json::json!("some text"));
    }
}
