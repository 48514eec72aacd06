//! Summarization pipeline orchestration
//!
//! Sequences the stages: paper lookup -> PDF download -> text extraction ->
//! section selection -> chunking -> per-chunk summarization -> ordered join.
//! The core over decoded pages is synchronous and free of concurrency
//! primitives; `summarize_title` is the async entry point and hands the
//! blocking work to a worker thread via `spawn_blocking`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::chunker;
use crate::papers::download;
use crate::papers::pdf_extractor;
use crate::papers::search::PaperSearchClient;
use crate::sections;
use crate::settings;
use crate::summarizer::{Summarizer, SummaryBounds};

/// Classified pipeline failure, one variant per stage
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Lookup collaborator failed (network or API error)
    #[error("paper lookup failed: {0}")]
    Lookup(String),
    /// Lookup succeeded but there is no retrievable PDF source
    #[error("no retrievable PDF source for \"{0}\"")]
    NotFound(String),
    /// Download returned a non-success status or network failure
    #[error("PDF download failed: {0}")]
    Transport(String),
    /// PDF bytes could not be decoded into text
    #[error("PDF decoding failed: {0}")]
    Decode(String),
    /// Summarization capability errored on a chunk (abort policy)
    #[error("summarization failed on chunk {chunk}: {reason}")]
    Summarization { chunk: usize, reason: String },
    /// The run was cancelled via the cancellation flag
    #[error("pipeline cancelled")]
    Cancelled,
    /// Worker thread died before producing a result
    #[error("pipeline worker failed: {0}")]
    Internal(String),
}

/// What to do when the summarization capability fails on one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole run on the first chunk error (default)
    #[default]
    Abort,
    /// Drop the failed fragment, record its index, and keep going
    Degrade,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::Degrade => "degrade",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "abort" => Some(FailurePolicy::Abort),
            "degrade" => Some(FailurePolicy::Degrade),
            _ => None,
        }
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Words per summarization chunk
    pub chunk_size_words: usize,
    /// Chunk failure policy
    pub failure_policy: FailurePolicy,
    /// Keep downloaded PDFs in this directory (None = discard)
    pub save_pdfs_to: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size_words: chunker::DEFAULT_CHUNK_SIZE,
            failure_policy: FailurePolicy::Abort,
            save_pdfs_to: None,
        }
    }
}

impl PipelineConfig {
    /// Build a config from stored settings
    pub fn from_settings() -> Self {
        Self {
            chunk_size_words: settings::get_chunk_size_words(),
            failure_policy: FailurePolicy::from_str(&settings::get_failure_policy())
                .unwrap_or_default(),
            save_pdfs_to: settings::get_download_dir(),
        }
    }
}

/// The joined summary for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalSummary {
    /// Per-chunk fragments joined with single spaces, in document order
    pub text: String,
    /// How many chunks the extracted text produced
    pub chunk_count: usize,
    /// Chunk indices dropped under the degrade policy (empty on full success)
    pub failed_chunks: Vec<usize>,
}

/// Outcome of a pipeline run: a summary, or explicitly nothing to summarize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(FinalSummary),
    /// No page matched any section marker - distinct from every error
    NoContent,
}

/// The extraction-and-chunked-summarization pipeline.
///
/// The summarization capability is injected once and reused across chunks
/// and runs; per-chunk calls are serialized in document order.
#[derive(Clone)]
pub struct SummaryPipeline {
    summarizer: Arc<dyn Summarizer>,
    config: PipelineConfig,
    cancel: Arc<AtomicBool>,
}

impl SummaryPipeline {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self::with_config(summarizer, PipelineConfig::default())
    }

    pub fn with_config(summarizer: Arc<dyn Summarizer>, config: PipelineConfig) -> Self {
        Self {
            summarizer,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared cancellation flag; set it to true to stop the run.
    ///
    /// Cancellation is observed before each stage and before each per-chunk
    /// summarization, so chunks not yet started are never sent to the
    /// capability.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.cancel.load(Ordering::Relaxed) {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Summarize a decoded document (ordered per-page text).
    ///
    /// Synchronous core: selects section-relevant pages, chunks the result,
    /// summarizes each chunk in order, and joins the fragments with single
    /// spaces. Returns `SummaryOutcome::NoContent` when no page matched a
    /// section marker.
    pub fn summarize_pages(&self, pages: &[String]) -> Result<SummaryOutcome, PipelineError> {
        self.check_cancelled()?;

        let extracted = sections::extract_sections(pages);
        let chunks = chunker::split_into_chunks(&extracted, self.config.chunk_size_words);

        if chunks.is_empty() {
            println!("[Pipeline] No section-relevant text found");
            return Ok(SummaryOutcome::NoContent);
        }

        println!(
            "[Pipeline] Summarizing {} chunks ({} policy)",
            chunks.len(),
            self.config.failure_policy.as_str()
        );

        let mut fragments: Vec<String> = Vec::with_capacity(chunks.len());
        let mut failed_chunks: Vec<usize> = Vec::new();
        let mut capability_calls: u64 = 0;

        for (index, chunk) in chunks.iter().enumerate() {
            self.check_cancelled()?;

            let word_count = chunk.split_whitespace().count();
            let Some(bounds) = SummaryBounds::for_input_words(word_count) else {
                // Too short to condense: keep the chunk verbatim
                fragments.push(chunk.clone());
                continue;
            };

            capability_calls += 1;
            match self.summarizer.summarize(chunk, bounds) {
                Ok(fragment) => fragments.push(fragment),
                Err(reason) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(PipelineError::Summarization {
                            chunk: index,
                            reason,
                        });
                    }
                    FailurePolicy::Degrade => {
                        eprintln!("[Pipeline] Chunk {} failed, dropping: {}", index, reason);
                        failed_chunks.push(index);
                    }
                },
            }
        }

        let _ = settings::add_usage(capability_calls, chunks.len() as u64);

        Ok(SummaryOutcome::Summary(FinalSummary {
            text: fragments.join(" "),
            chunk_count: chunks.len(),
            failed_chunks,
        }))
    }

    /// Find a paper by title, download its PDF, and summarize it.
    ///
    /// Async entry point: lookup and download await at the crate boundary;
    /// decoding and summarization run on a blocking worker thread, so the
    /// calling task is never blocked on the pipeline.
    pub async fn summarize_title(&self, title: &str) -> Result<SummaryOutcome, PipelineError> {
        self.check_cancelled()?;

        let record = PaperSearchClient::from_settings()
            .find_by_title(title)
            .await
            .map_err(PipelineError::Lookup)?
            .ok_or_else(|| PipelineError::NotFound(title.to_string()))?;

        let pdf_url = record
            .pdf_url
            .clone()
            .ok_or_else(|| PipelineError::NotFound(record.title.clone()))?;
        let pdf_source = record.pdf_source.as_deref().unwrap_or("unknown");

        self.check_cancelled()?;

        let pdf = download::download_pdf(&pdf_url, pdf_source)
            .await
            .map_err(PipelineError::Transport)?;
        let _ = settings::add_paper_fetched();

        if let Some(dir) = &self.config.save_pdfs_to {
            if let Err(e) = download::save_pdf(&pdf, &record.title, dir) {
                eprintln!("[Pipeline] Could not keep PDF: {}", e);
            }
        }

        self.check_cancelled()?;

        // Decode + summarize are blocking; run them off the async executor
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || {
            let pages = pdf_extractor::extract_pages(&pdf.bytes).map_err(PipelineError::Decode)?;
            pipeline.summarize_pages(&pages)
        })
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Scripted capability: summarizes a chunk to a tag of its first word,
    /// failing on chunks that contain `fail_on`.
    struct ScriptedSummarizer {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl ScriptedSummarizer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(word: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(word),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Summarizer for ScriptedSummarizer {
        fn summarize(&self, text: &str, _bounds: SummaryBounds) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(marker) = self.fail_on {
                if text.split_whitespace().any(|w| w == marker) {
                    return Err("scripted failure".to_string());
                }
            }

            let first = text.split_whitespace().next().unwrap_or("");
            Ok(format!("sum({})", first))
        }
    }

    /// One page: "abstract w1 w2 ... w179" = 180 words, so chunk size 60
    /// yields exactly three full chunks starting at abstract, w60, w120.
    fn three_chunk_page() -> Vec<String> {
        let mut words = vec!["abstract".to_string()];
        words.extend((1..180).map(|i| format!("w{}", i)));
        vec![words.join(" ")]
    }

    fn config(chunk_size: usize, policy: FailurePolicy) -> PipelineConfig {
        PipelineConfig {
            chunk_size_words: chunk_size,
            failure_policy: policy,
            save_pdfs_to: None,
        }
    }

    #[test]
    fn test_fragments_join_in_document_order() {
        let summarizer = Arc::new(ScriptedSummarizer::new());
        let pipeline =
            SummaryPipeline::with_config(summarizer.clone(), config(60, FailurePolicy::Abort));

        let outcome = pipeline.summarize_pages(&three_chunk_page()).unwrap();
        match outcome {
            SummaryOutcome::Summary(summary) => {
                assert_eq!(summary.text, "sum(abstract) sum(w60) sum(w120)");
                assert_eq!(summary.chunk_count, 3);
                assert!(summary.failed_chunks.is_empty());
            }
            SummaryOutcome::NoContent => panic!("expected a summary"),
        }
        assert_eq!(summarizer.call_count(), 3);
    }

    #[test]
    fn test_no_marker_pages_yield_no_content() {
        let summarizer = Arc::new(ScriptedSummarizer::new());
        let pipeline = SummaryPipeline::new(summarizer.clone());

        let pages = vec!["body text only".to_string(), "more body".to_string()];
        assert_eq!(
            pipeline.summarize_pages(&pages).unwrap(),
            SummaryOutcome::NoContent
        );
        assert_eq!(
            pipeline.summarize_pages(&[]).unwrap(),
            SummaryOutcome::NoContent
        );
        assert_eq!(summarizer.call_count(), 0);
    }

    #[test]
    fn test_short_chunks_pass_through_verbatim() {
        let summarizer = Arc::new(ScriptedSummarizer::new());
        let pipeline =
            SummaryPipeline::with_config(summarizer.clone(), config(100, FailurePolicy::Abort));

        // 5 words: bounds invert, the capability must not be invoked
        let pages = vec!["abstract of a tiny note".to_string()];
        let outcome = pipeline.summarize_pages(&pages).unwrap();

        match outcome {
            SummaryOutcome::Summary(summary) => {
                assert_eq!(summary.text, "abstract of a tiny note");
                assert_eq!(summary.chunk_count, 1);
            }
            SummaryOutcome::NoContent => panic!("expected a pass-through summary"),
        }
        assert_eq!(summarizer.call_count(), 0);
    }

    #[test]
    fn test_abort_policy_surfaces_chunk_error() {
        let summarizer = Arc::new(ScriptedSummarizer::failing_on("w60"));
        let pipeline =
            SummaryPipeline::with_config(summarizer, config(60, FailurePolicy::Abort));

        let err = pipeline.summarize_pages(&three_chunk_page()).unwrap_err();
        match err {
            PipelineError::Summarization { chunk, reason } => {
                assert_eq!(chunk, 1);
                assert_eq!(reason, "scripted failure");
            }
            other => panic!("expected a summarization error, got {:?}", other),
        }
    }

    #[test]
    fn test_degrade_policy_records_failed_chunk() {
        let summarizer = Arc::new(ScriptedSummarizer::failing_on("w60"));
        let pipeline =
            SummaryPipeline::with_config(summarizer, config(60, FailurePolicy::Degrade));

        let outcome = pipeline.summarize_pages(&three_chunk_page()).unwrap();
        match outcome {
            SummaryOutcome::Summary(summary) => {
                // Failed fragment is omitted but signalled by index
                assert_eq!(summary.text, "sum(abstract) sum(w120)");
                assert_eq!(summary.failed_chunks, vec![1]);
                assert_eq!(summary.chunk_count, 3);
            }
            SummaryOutcome::NoContent => panic!("expected a degraded summary"),
        }
    }

    #[test]
    fn test_cancellation_stops_before_summarizing() {
        let summarizer = Arc::new(ScriptedSummarizer::new());
        let pipeline = SummaryPipeline::new(summarizer.clone());

        pipeline.cancel_flag().store(true, Ordering::Relaxed);

        let err = pipeline.summarize_pages(&three_chunk_page()).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(summarizer.call_count(), 0);
    }

    #[test]
    fn test_failure_policy_strings() {
        assert_eq!(FailurePolicy::from_str("abort"), Some(FailurePolicy::Abort));
        assert_eq!(
            FailurePolicy::from_str("degrade"),
            Some(FailurePolicy::Degrade)
        );
        assert_eq!(FailurePolicy::from_str("other"), None);
        assert_eq!(FailurePolicy::Degrade.as_str(), "degrade");
    }

    #[test]
    fn test_error_messages_name_the_stage() {
        assert_eq!(
            PipelineError::NotFound("Some Paper".to_string()).to_string(),
            "no retrievable PDF source for \"Some Paper\""
        );
        assert_eq!(
            PipelineError::Transport("status 403".to_string()).to_string(),
            "PDF download failed: status 403"
        );
        assert_eq!(PipelineError::Cancelled.to_string(), "pipeline cancelled");
    }
}
