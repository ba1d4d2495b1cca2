use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::dedup::group_by_seed;
use crate::models::{CallInsights, Insight, InsightCategory, ThemeSummary, WeeklyRollup};

/// Configuration for the cross-call theme rollup
#[derive(Debug, Clone)]
pub struct RollupConfig {
    /// Minimum similarity to a theme's seed insight
    pub threshold: f64,
    pub max_themes: usize,
    pub examples_per_theme: usize,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            max_themes: 5,
            examples_per_theme: 3,
        }
    }
}

/// Summarize recurring themes across a batch
///
/// All insights are pooled regardless of category and grouped by similarity
/// to a seed. Groups with at least two members become themes, largest first;
/// equal sizes keep the order in which their seeds appeared.
pub fn build_rollup(
    insights: &CallInsights,
    week_start: NaiveDateTime,
    week_end: NaiveDateTime,
    config: &RollupConfig,
) -> WeeklyRollup {
    let pooled: Vec<(InsightCategory, &Insight)> = insights.iter().collect();
    let mut groups: Vec<Vec<usize>> = group_by_seed(&pooled, config.threshold, |(_, i)| {
        i.content.as_str()
    })
    .into_iter()
    .filter(|g| g.len() >= 2)
    .collect();
    groups.sort_by(|a, b| b.len().cmp(&a.len()));

    let top_themes: Vec<ThemeSummary> = groups
        .iter()
        .take(config.max_themes)
        .map(|group| summarize_theme(&pooled, group, config.examples_per_theme))
        .collect();

    debug!(
        "Rollup: {} insights, {} recurring themes",
        pooled.len(),
        groups.len()
    );

    let insights_by_category: BTreeMap<String, usize> = insights
        .category_counts()
        .into_iter()
        .map(|(category, count)| (category.title().to_string(), count))
        .collect();

    let reps_analyzed: Vec<String> = pooled
        .iter()
        .map(|(_, i)| i.source.rep_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    WeeklyRollup {
        week_start,
        week_end,
        total_calls_processed: insights.call_ids.len(),
        total_insights_extracted: insights.total_insights(),
        top_themes,
        insights_by_category,
        reps_analyzed,
    }
}

fn summarize_theme(
    pooled: &[(InsightCategory, &Insight)],
    group: &[usize],
    examples: usize,
) -> ThemeSummary {
    let members: Vec<(InsightCategory, &Insight)> = group.iter().map(|&i| pooled[i]).collect();

    let mut theme = "";
    for (_, insight) in &members {
        if insight.content.chars().count() > theme.chars().count() {
            theme = insight.content.as_str();
        }
    }

    let mut categories = Vec::new();
    let mut related_calls: Vec<String> = Vec::new();
    for (category, insight) in &members {
        if !categories.contains(category) {
            categories.push(*category);
        }
        if !related_calls.contains(&insight.source.call_id) {
            related_calls.push(insight.source.call_id.clone());
        }
    }

    ThemeSummary {
        theme: theme.to_string(),
        occurrence_count: members.len(),
        categories,
        example_insights: members
            .iter()
            .take(examples)
            .map(|(_, i)| i.content.clone())
            .collect(),
        related_calls,
    }
}
