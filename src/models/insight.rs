use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Extractor-reported certainty about an insight
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl Confidence {
    /// Precedence used when choosing between duplicates (HIGH=3 > MEDIUM=2 > LOW=1)
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::High => 3,
        }
    }

    /// Map free-form extractor output to a level; unrecognized input is `Medium`
    pub fn from_label(value: &str) -> Self {
        let value = value.to_lowercase();
        if value.contains("high") {
            Confidence::High
        } else if value.contains("low") {
            Confidence::Low
        } else {
            Confidence::Medium
        }
    }

    /// Capitalized display label
    pub fn title(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }
}

/// Provenance snapshot attached to an insight when it is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReference {
    pub call_id: String,
    pub call_date: NaiveDateTime,
    pub rep_name: String,
    /// Who said the quote, if a segment matched
    pub speaker_name: Option<String>,
    pub company_name: Option<String>,
    /// Position in the call (MM:SS or HH:MM:SS)
    pub timestamp: Option<String>,
    pub quote_snippet: Option<String>,
}

impl SourceReference {
    /// One-line reference for display, e.g. `Call: 2024-12-18 | Rep: Sarah | @00:04:12`
    pub fn format_reference(&self) -> String {
        let mut parts = vec![format!("Call: {}", self.call_date.format("%Y-%m-%d"))];
        if let Some(speaker) = &self.speaker_name {
            parts.push(format!("Speaker: {}", speaker));
        }
        parts.push(format!("Rep: {}", self.rep_name));
        if let Some(company) = &self.company_name {
            parts.push(format!("Company: {}", company));
        }
        if let Some(timestamp) = &self.timestamp {
            parts.push(format!("@{}", timestamp));
        }
        parts.join(" | ")
    }
}

/// A single extracted insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Deterministic key derived from content and call id
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub confidence: Confidence,
    pub source: SourceReference,
    #[serde(default)]
    pub direct_quote: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Insight {
    pub fn new(content: impl Into<String>, source: SourceReference) -> Self {
        Self {
            id: None,
            content: content.into(),
            confidence: Confidence::default(),
            source,
            direct_quote: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.direct_quote = Some(quote.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// Stable insight id: first 12 hex chars of SHA-256 over `<content prefix>:<call id>`
///
/// The prefix is the first 50 characters of the content, so re-extracting the
/// same content from the same call yields the same id.
pub fn insight_id(content: &str, call_id: &str) -> String {
    let prefix: String = content.chars().take(50).collect();
    let digest = Sha256::digest(format!("{}:{}", prefix, call_id).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(12);
    id
}

/// The six fixed insight categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    ProductRecommendations,
    PositiveFeedback,
    MarketingMessaging,
    SocialMessaging,
    FaqIdeas,
    BlogTopics,
}

impl InsightCategory {
    pub const ALL: [InsightCategory; 6] = [
        InsightCategory::ProductRecommendations,
        InsightCategory::PositiveFeedback,
        InsightCategory::MarketingMessaging,
        InsightCategory::SocialMessaging,
        InsightCategory::FaqIdeas,
        InsightCategory::BlogTopics,
    ];

    /// Look up a category by its machine name
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Machine name, as used by the extractor
    pub fn key(&self) -> &'static str {
        match self {
            InsightCategory::ProductRecommendations => "product_recommendations",
            InsightCategory::PositiveFeedback => "positive_feedback",
            InsightCategory::MarketingMessaging => "marketing_messaging",
            InsightCategory::SocialMessaging => "social_messaging",
            InsightCategory::FaqIdeas => "faq_ideas",
            InsightCategory::BlogTopics => "blog_topics",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            InsightCategory::ProductRecommendations => "Product Recommendations",
            InsightCategory::PositiveFeedback => "Positive Feedback & Testimonials",
            InsightCategory::MarketingMessaging => "Marketing & Brand Messaging",
            InsightCategory::SocialMessaging => "Social Messaging",
            InsightCategory::FaqIdeas => "FAQs Section Ideas",
            InsightCategory::BlogTopics => "Blog Topics & Ideas",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InsightCategory::ProductRecommendations => {
                "Feature requests, missing capabilities, integrations requested, 'you should build X'"
            }
            InsightCategory::PositiveFeedback => {
                "Quotes, outcomes, 'love this', value statements"
            }
            InsightCategory::MarketingMessaging => {
                "Feedback on website, emails, nurtures, positioning, clarity"
            }
            InsightCategory::SocialMessaging => {
                "Hooks, punchy phrases, what resonates, short quotes suitable for social"
            }
            InsightCategory::FaqIdeas => {
                "Repeated questions, confusion points, objections that can be answered publicly"
            }
            InsightCategory::BlogTopics => {
                "Pain points, trends, 'how do I...', 'what's the best way to...', repeated themes"
            }
        }
    }
}

/// Insights extracted from one call or aggregated across a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallInsights {
    pub call_ids: Vec<String>,
    pub processed_at: NaiveDateTime,
    /// Every category is always present, possibly empty
    pub categories: BTreeMap<InsightCategory, Vec<Insight>>,
}

impl CallInsights {
    pub fn new(call_ids: Vec<String>, processed_at: NaiveDateTime) -> Self {
        Self {
            call_ids,
            processed_at,
            categories: InsightCategory::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        }
    }

    pub fn insights(&self, category: InsightCategory) -> &[Insight] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn insights_mut(&mut self, category: InsightCategory) -> &mut Vec<Insight> {
        self.categories.entry(category).or_default()
    }

    /// All insights with their category, in category order
    pub fn iter(&self) -> impl Iterator<Item = (InsightCategory, &Insight)> {
        self.categories
            .iter()
            .flat_map(|(category, insights)| insights.iter().map(move |i| (*category, i)))
    }

    pub fn total_insights(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Per-category counts in fixed category order
    pub fn category_counts(&self) -> Vec<(InsightCategory, usize)> {
        InsightCategory::ALL
            .into_iter()
            .map(|category| (category, self.insights(category).len()))
            .collect()
    }

    /// Append another result's call ids and insights, category by category
    pub fn extend(&mut self, other: CallInsights) {
        self.call_ids.extend(other.call_ids);
        for (category, insights) in other.categories {
            self.insights_mut(category).extend(insights);
        }
    }

    /// Apply `f` to every category's list in place
    pub fn map_categories(&mut self, mut f: impl FnMut(InsightCategory, Vec<Insight>) -> Vec<Insight>) {
        for (category, insights) in self.categories.iter_mut() {
            let current = std::mem::take(insights);
            *insights = f(*category, current);
        }
    }
}

/// A recurring theme found across calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub theme: String,
    pub occurrence_count: usize,
    pub categories: Vec<InsightCategory>,
    pub example_insights: Vec<String>,
    pub related_calls: Vec<String>,
}

/// Rollup over a reporting period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyRollup {
    pub week_start: NaiveDateTime,
    pub week_end: NaiveDateTime,
    pub total_calls_processed: usize,
    pub total_insights_extracted: usize,
    pub top_themes: Vec<ThemeSummary>,
    /// Display title -> count
    pub insights_by_category: BTreeMap<String, usize>,
    pub reps_analyzed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn source() -> SourceReference {
        SourceReference {
            call_id: "CALL-001".to_string(),
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

    #[test]
    fn test_confidence_rank_ordering() {
        assert!(Confidence::High.rank() > Confidence::Medium.rank());
        assert!(Confidence::Medium.rank() > Confidence::Low.rank());
        assert!(Confidence::High > Confidence::Low);
        assert_eq!(Confidence::default(), Confidence::Medium);
    }

    #[test]
    fn test_confidence_from_label() {
        assert_eq!(Confidence::from_label("HIGH"), Confidence::High);
        assert_eq!(Confidence::from_label("low"), Confidence::Low);
        assert_eq!(Confidence::from_label("medium"), Confidence::Medium);
        assert_eq!(Confidence::from_label("very high"), Confidence::High);
        assert_eq!(Confidence::from_label("certain"), Confidence::Medium);
        assert_eq!(Confidence::from_label(""), Confidence::Medium);
    }

    #[test]
    fn test_format_reference() {
        let mut source = source();
        assert_eq!(source.format_reference(), "Call: 2024-12-18 | Rep: Test Rep");

        source.speaker_name = Some("Dana".to_string());
        source.company_name = Some("Acme".to_string());
        source.timestamp = Some("00:04:12".to_string());
        assert_eq!(
            source.format_reference(),
            "Call: 2024-12-18 | Speaker: Dana | Rep: Test Rep | Company: Acme | @00:04:12"
        );
    }

    #[test]
    fn test_insight_id_is_deterministic() {
        let a = insight_id("Add HubSpot integration", "CALL-001");
        let b = insight_id("Add HubSpot integration", "CALL-001");
        let c = insight_id("Add HubSpot integration", "CALL-002");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_insight_id_uses_content_prefix() {
        let base = "x".repeat(50);
        let a = insight_id(&format!("{}one", base), "CALL-001");
        let b = insight_id(&format!("{}two", base), "CALL-001");
        assert_eq!(a, b);
    }

    #[test]
    fn test_call_insights_counts() {
        let processed_at = source().call_date;
        let mut insights = CallInsights::new(vec!["CALL-001".to_string()], processed_at);
        assert_eq!(insights.total_insights(), 0);
        assert_eq!(insights.categories.len(), 6);

        insights
            .insights_mut(InsightCategory::FaqIdeas)
            .push(Insight::new("How does pricing work?", source()));

        let mut other = CallInsights::new(vec!["CALL-002".to_string()], processed_at);
        other
            .insights_mut(InsightCategory::FaqIdeas)
            .push(Insight::new("Is there an API?", source()));
        other
            .insights_mut(InsightCategory::BlogTopics)
            .push(Insight::new("Scaling outbound", source()));

        insights.extend(other);

        assert_eq!(insights.call_ids, vec!["CALL-001", "CALL-002"]);
        assert_eq!(insights.total_insights(), 3);
        let counts = insights.category_counts();
        assert_eq!(counts[4], (InsightCategory::FaqIdeas, 2));
        assert_eq!(counts[5], (InsightCategory::BlogTopics, 1));
        assert_eq!(insights.iter().count(), 3);
    }

    #[test]
    fn test_category_from_key() {
        assert_eq!(
            InsightCategory::from_key("blog_topics"),
            Some(InsightCategory::BlogTopics)
        );
        assert_eq!(InsightCategory::from_key("Blog Topics"), None);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&InsightCategory::FaqIdeas).unwrap();
        assert_eq!(json, "\"faq_ideas\"");
        for category in InsightCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.key()));
        }
    }
}
