use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::dedup::{DedupConfig, MergeConfig};
use crate::matching::QuoteMatchConfig;
use crate::models::{CallInsights, Transcript, TranscriptCollection};

use super::{ExtractError, ExtractionRequest, Extractor, convert_extraction};

/// Configuration for the extraction pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub quote_match: QuoteMatchConfig,
    pub dedup: DedupConfig,
    /// Run the deduplicator over every category after extraction
    pub deduplicate: bool,
    /// Run the merger after deduplication
    pub merge: Option<MergeConfig>,
    /// Longest transcript text sent to the extractor, in characters
    pub max_transcript_chars: usize,
    /// Extra attempts per transcript after a failed extraction
    pub max_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quote_match: QuoteMatchConfig::default(),
            dedup: DedupConfig::default(),
            deduplicate: true,
            merge: None,
            max_transcript_chars: 15000,
            max_retries: 1,
        }
    }
}

/// A transcript whose extraction failed
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionFailure {
    pub call_id: String,
    pub error: String,
}

/// Result of processing a batch of transcripts
#[derive(Debug)]
pub struct BatchResult {
    /// Aggregated insights from every transcript that succeeded
    pub insights: CallInsights,
    pub failures: Vec<ExtractionFailure>,
    pub processing_time: Duration,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.insights.call_ids.len()
    }
}

/// Extract and convert insights for one transcript
pub async fn extract_transcript<E: Extractor>(
    extractor: &E,
    transcript: &Transcript,
    config: &PipelineConfig,
) -> Result<CallInsights, ExtractError> {
    let request = ExtractionRequest::from_transcript(transcript, config.max_transcript_chars);

    let mut attempt = 0;
    let raw = loop {
        match extractor.extract(&request).await {
            Ok(raw) => break raw,
            Err(e) if attempt < config.max_retries => {
                attempt += 1;
                warn!(
                    "Call {}: extraction failed ({}), retry {} of {}",
                    request.call_id, e, attempt, config.max_retries
                );
            }
            Err(e) => return Err(e),
        }
    };

    Ok(convert_extraction(
        &raw,
        transcript,
        &config.quote_match,
        Local::now().naive_local(),
    ))
}

/// Extract insights from every transcript in a collection
///
/// Transcripts are processed in order. A failed transcript is logged and
/// recorded; results from the others are kept. Aggregation runs over
/// whatever succeeded.
pub async fn extract_collection<E: Extractor>(
    extractor: &E,
    collection: &TranscriptCollection,
    config: &PipelineConfig,
) -> BatchResult {
    let start = Instant::now();
    let mut results = Vec::new();
    let mut failures = Vec::new();

    for transcript in &collection.transcripts {
        let call_id = &transcript.metadata.call_id;
        match extract_transcript(extractor, transcript, config).await {
            Ok(insights) => {
                info!("Call {}: {} insights", call_id, insights.total_insights());
                results.push(insights);
            }
            Err(e) => {
                warn!("Call {} failed: {}", call_id, e);
                failures.push(ExtractionFailure {
                    call_id: call_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let insights = aggregate(results, Local::now().naive_local(), config);

    info!(
        "Processed {} calls ({} failed): {} insights",
        collection.total_calls(),
        failures.len(),
        insights.total_insights()
    );

    BatchResult {
        insights,
        failures,
        processing_time: start.elapsed(),
    }
}

/// Combine per-call results and run dedup and merge over each category
pub fn aggregate(
    results: Vec<CallInsights>,
    processed_at: NaiveDateTime,
    config: &PipelineConfig,
) -> CallInsights {
    let mut combined = CallInsights::new(Vec::new(), processed_at);
    for result in results {
        combined.extend(result);
    }

    if config.deduplicate {
        combined.dedupe(&config.dedup);
    }
    if let Some(merge) = &config.merge {
        combined.merge_similar(merge);
    }

    combined
}
