use tracing::debug;

use crate::matching::content_similarity;
use crate::models::Insight;

/// Configuration for near-duplicate removal
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Minimum similarity for two insights to count as the same
    pub threshold: f64,
    /// Let a higher-confidence duplicate replace the one already kept
    pub prefer_higher_confidence: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            prefer_higher_confidence: true,
        }
    }
}

/// Collapse near-duplicate insights
///
/// Each insight is compared, in input order, against the insights already
/// kept. The first kept insight at or above the threshold is its duplicate
/// target. A higher-confidence duplicate replaces the target in place (when
/// enabled); otherwise the incoming insight is dropped. Survivors keep the
/// order in which their slot was first filled.
///
/// Quadratic in the number of insights; fine for per-batch counts in the tens.
pub fn dedupe(insights: Vec<Insight>, config: &DedupConfig) -> Vec<Insight> {
    let input_count = insights.len();
    let mut kept: Vec<Insight> = Vec::with_capacity(input_count);

    for insight in insights {
        let target = kept
            .iter()
            .position(|existing| content_similarity(&insight.content, &existing.content) >= config.threshold);

        match target {
            Some(index) => {
                if config.prefer_higher_confidence
                    && insight.confidence.rank() > kept[index].confidence.rank()
                {
                    kept[index] = insight;
                }
            }
            None => kept.push(insight),
        }
    }

    if kept.len() < input_count {
        debug!(
            "Dedup: {} insights -> {} (threshold {:.2})",
            input_count,
            kept.len(),
            config.threshold
        );
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, SourceReference};
    use chrono::NaiveDate;

    fn source(call_id: &str) -> SourceReference {
        SourceReference {
            call_id: call_id.to_string(),
            call_date: NaiveDate::from_ymd_opt(2024, 12, 18)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            rep_name: "Test Rep".to_string(),
            speaker_name: None,
            company_name: None,
            timestamp: None,
            quote_snippet: None,
        }
    }

    fn insight(content: &str, confidence: Confidence) -> Insight {
        Insight::new(content, source("CALL-001")).with_confidence(confidence)
    }

    #[test]
    fn test_dedupe_removes_duplicates() {
        let insights = vec![
            insight("Add HubSpot integration", Confidence::Medium),
            insight("Add HubSpot Integration feature", Confidence::Medium),
            insight("The pricing page is confusing", Confidence::Medium),
        ];

        let config = DedupConfig {
            threshold: 0.7,
            ..Default::default()
        };
        let result = dedupe(insights, &config);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "Add HubSpot integration");
        assert_eq!(result[1].content, "The pricing page is confusing");
    }

    #[test]
    fn test_dedupe_keeps_higher_confidence() {
        let insights = vec![
            insight("Add HubSpot integration", Confidence::Low),
            insight("Add HubSpot Integration", Confidence::High),
        ];

        let config = DedupConfig {
            threshold: 0.8,
            prefer_higher_confidence: true,
        };
        let result = dedupe(insights, &config);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].confidence, Confidence::High);
        assert_eq!(result[0].content, "Add HubSpot Integration");
    }

    #[test]
    fn test_dedupe_keeps_first_when_not_preferring_confidence() {
        let insights = vec![
            insight("Add HubSpot integration", Confidence::Low),
            insight("Add HubSpot Integration", Confidence::High),
        ];

        let config = DedupConfig {
            threshold: 0.8,
            prefer_higher_confidence: false,
        };
        let result = dedupe(insights, &config);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_dedupe_equal_confidence_keeps_existing() {
        let insights = vec![
            insight("Add HubSpot integration", Confidence::High),
            insight("add hubspot integration", Confidence::High),
        ];
        let result = dedupe(insights, &DedupConfig::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content, "Add HubSpot integration");
    }

    #[test]
    fn test_dedupe_preserves_first_occurrence_order() {
        let insights = vec![
            insight("Add Slack notifications", Confidence::Low),
            insight("The dashboard is very intuitive", Confidence::Medium),
            insight("Add Slack notification support", Confidence::High),
        ];
        let result = dedupe(insights, &DedupConfig::default());

        assert_eq!(result.len(), 2);
        // The replacement takes the slot of the insight it replaced
        assert_eq!(result[0].content, "Add Slack notification support");
        assert_eq!(result[0].confidence, Confidence::High);
        assert_eq!(result[1].content, "The dashboard is very intuitive");
    }

    #[test]
    fn test_dedupe_uses_first_match_not_best_match() {
        // "we want a mobile app" is closer to the second kept insight,
        // but the first one already clears the threshold.
        let insights = vec![
            insight("We want a mobile application", Confidence::Low),
            insight("We want mobile apps", Confidence::Low),
            insight("We want a mobile app", Confidence::High),
        ];
        let config = DedupConfig {
            threshold: 0.7,
            prefer_higher_confidence: true,
        };
        let result = dedupe(insights, &config);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "We want a mobile app");
        assert_eq!(result[1].content, "We want mobile apps");
        assert_eq!(result[1].confidence, Confidence::Low);
    }

    #[test]
    fn test_dedupe_empty_list() {
        let result = dedupe(vec![], &DedupConfig::default());
        assert!(result.is_empty());
    }
}
