use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{CallInsights, WeeklyRollup};

/// Machine-readable insights report
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport<'a> {
    pub generated_at: NaiveDateTime,
    pub total_calls: usize,
    pub total_insights: usize,
    /// Category key -> count
    pub counts: BTreeMap<&'static str, usize>,
    pub insights: &'a CallInsights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollup: Option<&'a WeeklyRollup>,
}

impl<'a> InsightsReport<'a> {
    pub fn new(
        insights: &'a CallInsights,
        rollup: Option<&'a WeeklyRollup>,
        generated_at: NaiveDateTime,
    ) -> Self {
        Self {
            generated_at,
            total_calls: insights.call_ids.len(),
            total_insights: insights.total_insights(),
            counts: insights
                .category_counts()
                .into_iter()
                .map(|(category, count)| (category.key(), count))
                .collect(),
            insights,
            rollup,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable markdown report
pub struct MarkdownReport<'a> {
    insights: &'a CallInsights,
    rollup: Option<&'a WeeklyRollup>,
    title: String,
    generated_at: NaiveDateTime,
}

impl<'a> MarkdownReport<'a> {
    pub fn new(insights: &'a CallInsights, generated_at: NaiveDateTime) -> Self {
        Self {
            insights,
            rollup: None,
            title: format!("Meeting Insights - {}", generated_at.format("%B %d, %Y")),
            generated_at,
        }
    }

    pub fn with_rollup(mut self, rollup: &'a WeeklyRollup) -> Self {
        self.rollup = Some(rollup);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Format the report as markdown
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.title));
        output.push_str("---\n\n## Summary\n\n");
        output.push_str(&format!(
            "- **Calls Analyzed:** {}\n",
            self.insights.call_ids.len()
        ));
        output.push_str(&format!(
            "- **Total Insights:** {}\n",
            self.insights.total_insights()
        ));
        output.push_str(&format!(
            "- **Generated:** {}\n\n",
            self.generated_at.format("%Y-%m-%d at %H:%M")
        ));

        if let Some(rollup) = self.rollup.filter(|r| !r.top_themes.is_empty()) {
            output.push_str("---\n\n## Top Themes\n\n");
            for (i, theme) in rollup.top_themes.iter().enumerate() {
                output.push_str(&format!(
                    "{}. **{}** (appeared {} times)\n",
                    i + 1,
                    theme.theme,
                    theme.occurrence_count
                ));
                for example in theme.example_insights.iter().take(2) {
                    output.push_str(&format!("   - {}\n", example));
                }
                output.push('\n');
            }
        }

        for (category, insights) in &self.insights.categories {
            output.push_str(&format!("---\n\n## {}\n\n", category.title()));
            output.push_str(&format!("*{}*\n\n", category.description()));

            if insights.is_empty() {
                output.push_str("*No insights extracted for this category.*\n\n");
                continue;
            }

            for (i, insight) in insights.iter().enumerate() {
                output.push_str(&format!("### {}. {}\n\n", i + 1, insight.content));
                if let Some(quote) = &insight.direct_quote {
                    output.push_str(&format!("> \"{}\"\n\n", quote));
                }
                output.push_str(&format!(
                    "**Source:** {}\n\n",
                    insight.source.format_reference()
                ));
                output.push_str(&format!(
                    "**Confidence:** {}\n\n",
                    insight.confidence.title()
                ));
            }
        }

        output
    }

    /// Write to a markdown file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}
