pub mod batch;
pub mod convert;
pub mod error;
pub mod rollup;

pub use batch::*;
pub use convert::*;
pub use error::*;
pub use rollup::*;

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{InsightCategory, Transcript};

/// Default call type when the transcript doesn't carry one
pub const DEFAULT_CALL_TYPE: &str = "Sales Call";

/// Default company label when the transcript doesn't carry one
pub const DEFAULT_COMPANY: &str = "Unknown";

/// Everything an extractor needs to see about one call
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub call_id: String,
    /// Rendered transcript, already truncated
    pub transcript_text: String,
    /// `YYYY-MM-DD`
    pub call_date: String,
    pub rep_name: String,
    pub company_name: String,
    pub call_type: String,
}

impl ExtractionRequest {
    /// Build a request from a transcript, keeping at most `max_chars` characters of text
    pub fn from_transcript(transcript: &Transcript, max_chars: usize) -> Self {
        let full_text = transcript.full_text();
        let transcript_text = match full_text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                debug!(
                    "Truncating transcript {} to {} chars",
                    transcript.metadata.call_id, max_chars
                );
                full_text[..cut].to_string()
            }
            None => full_text,
        };

        let metadata = &transcript.metadata;
        Self {
            call_id: metadata.call_id.clone(),
            transcript_text,
            call_date: metadata.call_date.format("%Y-%m-%d").to_string(),
            rep_name: metadata.rep_name.clone(),
            company_name: metadata
                .company_name
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
            call_type: metadata
                .call_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CALL_TYPE.to_string()),
        }
    }
}

/// One insight as reported by the extractor, before enrichment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInsightItem {
    pub content: String,
    /// Free-form level, mapped with `Confidence::from_label`
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub direct_quote: Option<String>,
    #[serde(default)]
    pub timestamp_hint: Option<String>,
}

impl RawInsightItem {
    pub fn new(content: impl Into<String>, confidence: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            confidence: confidence.into(),
            ..Default::default()
        }
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.direct_quote = Some(quote.into());
        self
    }

    pub fn with_timestamp_hint(mut self, hint: impl Into<String>) -> Self {
        self.timestamp_hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CategoryItems {
    #[serde(default)]
    insights: Vec<RawInsightItem>,
}

/// Structured extractor output: raw items per category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExtraction {
    pub categories: BTreeMap<InsightCategory, Vec<RawInsightItem>>,
}

impl RawExtraction {
    /// Parse `{"<category_key>": {"insights": [...]}, ...}`
    ///
    /// Missing categories are empty; unknown keys are ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let parsed: BTreeMap<String, CategoryItems> = serde_json::from_value(value)?;
        let mut categories = BTreeMap::new();
        for (key, items) in parsed {
            match InsightCategory::from_key(&key) {
                Some(category) => {
                    categories.insert(category, items.insights);
                }
                None => debug!("Ignoring unknown extractor category {:?}", key),
            }
        }
        Ok(Self { categories })
    }

    pub fn with_items(mut self, category: InsightCategory, items: Vec<RawInsightItem>) -> Self {
        self.categories.insert(category, items);
        self
    }

    pub fn items(&self, category: InsightCategory) -> &[RawInsightItem] {
        self.categories.get(&category).map_or(&[], Vec::as_slice)
    }

    pub fn total_items(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// The external insight extractor
///
/// Implementations turn one call's transcript into raw categorized items.
/// Anything fallible (network, auth, output parsing) surfaces as an error;
/// the batch pipeline records it and moves on.
pub trait Extractor {
    fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> impl Future<Output = Result<RawExtraction, ExtractError>> + Send;
}
