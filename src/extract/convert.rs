use chrono::NaiveDateTime;
use tracing::debug;

use crate::matching::{QuoteMatchConfig, best_match_scored};
use crate::models::{
    CallInsights, Confidence, Insight, SourceReference, Transcript, insight_id,
};

use super::{RawExtraction, RawInsightItem};

/// Turn raw extractor items into insights with provenance
///
/// Each item's quote is matched against the transcript's segments. A match
/// supplies the speaker name and display timestamp; otherwise the item's own
/// timestamp hint is used and no speaker is recorded.
pub fn convert_items(
    items: &[RawInsightItem],
    transcript: &Transcript,
    config: &QuoteMatchConfig,
) -> Vec<Insight> {
    let metadata = &transcript.metadata;
    let mut unmatched = 0;

    let insights = items
        .iter()
        .map(|item| {
            let quote = item.direct_quote.as_deref().filter(|q| !q.is_empty());
            let matched = quote
                .and_then(|q| best_match_scored(&transcript.segments, q, config))
                .map(|m| m.segment);
            if quote.is_some() && matched.is_none() {
                unmatched += 1;
            }

            let (speaker_name, timestamp) = match matched {
                Some(segment) => (segment.speaker_name.clone(), segment.timestamp_display()),
                None => (None, item.timestamp_hint.clone()),
            };

            let source = SourceReference {
                call_id: metadata.call_id.clone(),
                call_date: metadata.call_date,
                rep_name: metadata.rep_name.clone(),
                speaker_name,
                company_name: metadata.company_name.clone(),
                timestamp,
                quote_snippet: quote.map(str::to_string),
            };

            let mut insight = Insight::new(item.content.clone(), source)
                .with_confidence(Confidence::from_label(&item.confidence));
            insight.id = Some(insight_id(&item.content, &metadata.call_id));
            if let Some(q) = quote {
                insight = insight.with_quote(q);
            }
            insight
        })
        .collect();

    if unmatched > 0 {
        debug!(
            "{} of {} quotes in {} matched no segment",
            unmatched,
            items.len(),
            metadata.call_id
        );
    }

    insights
}

/// Convert a whole extraction for one transcript
pub fn convert_extraction(
    raw: &RawExtraction,
    transcript: &Transcript,
    config: &QuoteMatchConfig,
    processed_at: NaiveDateTime,
) -> CallInsights {
    let mut result = CallInsights::new(vec![transcript.metadata.call_id.clone()], processed_at);
    for (category, items) in &raw.categories {
        result
            .insights_mut(*category)
            .extend(convert_items(items, transcript, config));
    }
    result
}
