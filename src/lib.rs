pub mod chunker;
pub mod papers;
pub mod pipeline;
pub mod sections;
pub mod settings;
pub mod summarizer;

pub use papers::{PaperRecord, ResolvedPdf};
pub use pipeline::{
    FailurePolicy, FinalSummary, PipelineConfig, PipelineError, SummaryOutcome, SummaryPipeline,
};
pub use summarizer::{HfSummarizer, Summarizer, SummaryBounds};
