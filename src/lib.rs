pub mod dedup;
pub mod extract;
pub mod io;
pub mod llm;
pub mod matching;
pub mod models;
pub mod segmenter;

pub use dedup::{dedupe, merge_similar, DedupConfig, MergeConfig};
pub use extract::{
    build_rollup, extract_collection, extract_transcript, BatchResult, ExtractError,
    ExtractionRequest, Extractor, PipelineConfig, RawExtraction, RollupConfig,
};
pub use io::{load_collection, load_transcript_file, InsightsReport, MarkdownReport};
pub use llm::{AnthropicClient, AnthropicConfig};
pub use matching::{best_match, QuoteMatchConfig};
pub use models::{
    CallInsights, CallMetadata, Confidence, Insight, InsightCategory, Segment, SourceReference,
    Speaker, Transcript, TranscriptCollection, WeeklyRollup,
};
pub use segmenter::{build_transcript, segment, SegmenterConfig, TextTranscriptOptions};
