use std::collections::BTreeSet;

use tracing::debug;

use crate::matching::content_similarity;
use crate::models::Insight;

/// Configuration for aggressive similarity merging
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Minimum similarity to the group seed for an insight to join the group
    pub threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { threshold: 0.6 }
    }
}

/// Group items by similarity to a seed, in a single greedy pass
///
/// Each unassigned item opens a group and pulls in every later unassigned
/// item whose similarity to that seed clears `threshold`. Members are only
/// compared with the seed, never with each other, so grouping is neither
/// symmetric nor transitive. Returns groups of indices, seed first.
pub fn group_by_seed<T>(items: &[T], threshold: f64, text: impl Fn(&T) -> &str) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; items.len()];
    let mut groups = Vec::new();

    for seed in 0..items.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut group = vec![seed];
        for candidate in (seed + 1)..items.len() {
            if assigned[candidate] {
                continue;
            }
            if content_similarity(text(&items[seed]), text(&items[candidate])) >= threshold {
                group.push(candidate);
                assigned[candidate] = true;
            }
        }

        groups.push(group);
    }

    groups
}

/// Merge groups of similar insights into one representative each
///
/// A merged insight takes the longest member's content and id, the highest
/// confidence, the seed's source, the union of tags, and the seed's quote
/// (falling back to the first member quote). Singleton groups pass through.
pub fn merge_similar(insights: Vec<Insight>, config: &MergeConfig) -> Vec<Insight> {
    if insights.len() <= 1 {
        return insights;
    }

    let input_count = insights.len();
    let groups = group_by_seed(&insights, config.threshold, |i| i.content.as_str());

    let mut slots: Vec<Option<Insight>> = insights.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(groups.len());

    for group in groups {
        let members: Vec<Insight> = group.iter().filter_map(|&i| slots[i].take()).collect();
        if let Some(insight) = merge_group(members) {
            merged.push(insight);
        }
    }

    if merged.len() < input_count {
        debug!(
            "Merge: {} insights -> {} (threshold {:.2})",
            input_count,
            merged.len(),
            config.threshold
        );
    }

    merged
}

/// Collapse one group (seed first) into a single insight
fn merge_group(mut members: Vec<Insight>) -> Option<Insight> {
    if members.len() <= 1 {
        return members.pop();
    }

    // First longest wins ties
    let mut longest = 0;
    for (i, member) in members.iter().enumerate() {
        if member.content.chars().count() > members[longest].content.chars().count() {
            longest = i;
        }
    }

    let confidence = members
        .iter()
        .map(|m| m.confidence)
        .max_by_key(|c| c.rank())
        .unwrap_or_default();

    let tags: BTreeSet<String> = members.iter().flat_map(|m| m.tags.iter().cloned()).collect();

    let direct_quote = members
        .iter()
        .find_map(|m| m.direct_quote.clone());

    let seed = &members[0];
    Some(Insight {
        id: members[longest].id.clone(),
        content: members[longest].content.clone(),
        confidence,
        source: seed.source.clone(),
        direct_quote,
        tags,
    })
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

    fn insight(content: &str, call_id: &str, confidence: Confidence) -> Insight {
        Insight::new(content, source(call_id)).with_confidence(confidence)
    }

    #[test]
    fn test_merge_groups_against_seed() {
        let insights = vec![
            insight("We want a mobile app", "CALL-A", Confidence::Low)
                .with_tag("mobile"),
            insight("We want a mobile application", "CALL-B", Confidence::Medium)
                .with_tag("apps"),
            // Passes against the seed even though it is not close to the second member
            insight("We want mobile apps", "CALL-C", Confidence::High)
                .with_quote("honestly we just want mobile apps"),
        ];
        let config = MergeConfig { threshold: 0.7 };
        let merged = merge_similar(insights, &config);

        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.content, "We want a mobile application");
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(m.source.call_id, "CALL-A");
        assert_eq!(m.direct_quote.as_deref(), Some("honestly we just want mobile apps"));
        assert!(m.tags.contains("mobile") && m.tags.contains("apps"));
    }

    #[test]
    fn test_merge_is_not_transitive() {
        let insights = vec![
            insight("We want mobile apps", "CALL-A", Confidence::Medium),
            insight("We want a mobile app", "CALL-B", Confidence::Medium),
            // Close to the second insight only
            insight("We want a mobile application", "CALL-C", Confidence::Medium),
        ];
        let merged = merge_similar(insights, &MergeConfig { threshold: 0.7 });

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "We want a mobile app");
        assert_eq!(merged[1].content, "We want a mobile application");
        assert_eq!(merged[1].source.call_id, "CALL-C");
    }

    #[test]
    fn test_merge_prefers_seed_quote() {
        let insights = vec![
            insight("Add Slack notifications", "CALL-A", Confidence::Medium)
                .with_quote("seed quote"),
            insight("Add Slack notification support", "CALL-B", Confidence::Medium)
                .with_quote("member quote"),
        ];
        let merged = merge_similar(insights, &MergeConfig::default());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].direct_quote.as_deref(), Some("seed quote"));
        assert_eq!(merged[0].content, "Add Slack notification support");
    }

    #[test]
    fn test_merge_single_passes_through() {
        let mut only = insight("Pricing is confusing", "CALL-A", Confidence::Low);
        only.id = Some("abc123".to_string());
        let merged = merge_similar(vec![only.clone()], &MergeConfig::default());
        assert_eq!(merged, vec![only]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_similar(vec![], &MergeConfig::default()).is_empty());
    }

    #[test]
    fn test_merge_keeps_unrelated_apart() {
        let insights = vec![
            insight("The dashboard is very intuitive", "CALL-A", Confidence::High),
            insight("We need a Salesforce integration", "CALL-B", Confidence::Low),
        ];
        let merged = merge_similar(insights.clone(), &MergeConfig::default());
        assert_eq!(merged, insights);
    }

    #[test]
    fn test_group_by_seed_indices() {
        let texts = vec!["we want a mobile app", "the api docs are confusing", "we want mobile apps"];
        let groups = group_by_seed(&texts, 0.7, |t| *t);
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
    }
}
