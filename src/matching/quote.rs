use tracing::trace;

use crate::models::Segment;

use super::similarity::{normalize_for_match, similarity_ratio};

/// Configuration for quote-to-segment matching
#[derive(Debug, Clone)]
pub struct QuoteMatchConfig {
    /// Minimum score for a match to be accepted
    pub threshold: f64,
}

impl Default for QuoteMatchConfig {
    fn default() -> Self {
        Self { threshold: 0.55 }
    }
}

/// A segment matched to a quote
#[derive(Debug, Clone, Copy)]
pub struct QuoteMatch<'a> {
    pub segment: &'a Segment,
    /// Position of the segment in the transcript
    pub index: usize,
    pub score: f64,
}

/// Find the segment that best matches `quote` using the default threshold
pub fn best_match<'a>(segments: &'a [Segment], quote: &str) -> Option<&'a Segment> {
    best_match_scored(segments, quote, &QuoteMatchConfig::default()).map(|m| m.segment)
}

/// Find the best-scoring segment for `quote`
///
/// Containment in either direction scores 1.0; otherwise the score is the
/// similarity ratio of the normalized strings. The first segment with the
/// strictly highest score wins, and it is returned only if the score reaches
/// the configured threshold.
pub fn best_match_scored<'a>(
    segments: &'a [Segment],
    quote: &str,
    config: &QuoteMatchConfig,
) -> Option<QuoteMatch<'a>> {
    if quote.is_empty() || segments.is_empty() {
        return None;
    }

    let normalized_quote = normalize_for_match(quote);
    if normalized_quote.is_empty() {
        return None;
    }

    let mut best: Option<QuoteMatch<'a>> = None;

    for (index, segment) in segments.iter().enumerate() {
        let normalized_segment = normalize_for_match(&segment.text);
        if normalized_segment.is_empty() {
            continue;
        }

        let score = score_normalized(&normalized_quote, &normalized_segment);
        if score > best.map_or(0.0, |b| b.score) {
            best = Some(QuoteMatch {
                segment,
                index,
                score,
            });
        }
    }

    match best {
        Some(found) if found.score >= config.threshold => Some(found),
        Some(found) => {
            trace!(
                "Best segment {} scored {:.3}, below threshold {:.2}",
                found.index, found.score, config.threshold
            );
            None
        }
        None => None,
    }
}

/// Score two already-normalized strings
pub fn score_normalized(quote: &str, segment_text: &str) -> f64 {
    if segment_text.contains(quote) || quote.contains(segment_text) {
        1.0
    } else {
        similarity_ratio(quote, segment_text)
    }
}
