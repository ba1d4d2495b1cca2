pub mod inference;
pub mod labeled;
pub mod timestamped;

pub use inference::*;
pub use labeled::*;
pub use timestamped::*;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::models::{CallMetadata, DEFAULT_REP_NAME, Segment, Transcript};

/// Configuration for transcript segmentation and metadata inference
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Label fragments that mark the sales rep
    pub rep_keywords: Vec<String>,
    /// Label fragments that mark the prospect
    pub prospect_keywords: Vec<String>,
    /// Role fragments that mark an internal participant
    pub internal_role_keywords: Vec<String>,
    /// The organization's own email domain
    pub internal_email_domain: String,
    /// Longest unmatched label still treated as a speaker name
    pub max_name_words: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            rep_keywords: vec!["rep".to_string(), "sales".to_string(), "ae".to_string()],
            prospect_keywords: vec![
                "prospect".to_string(),
                "customer".to_string(),
                "client".to_string(),
                "buyer".to_string(),
            ],
            internal_role_keywords: vec![
                "account executive".to_string(),
                "sales".to_string(),
                "ae".to_string(),
                "customer success".to_string(),
                "csm".to_string(),
                "solutions engineer".to_string(),
                "product manager".to_string(),
            ],
            internal_email_domain: "ourcompany.com".to_string(),
            max_name_words: 3,
        }
    }
}

/// A segment parser strategy: returns no segments when the format doesn't apply
pub type SegmentParser = fn(&[&str], Option<&str>, &SegmenterConfig) -> Vec<Segment>;

/// Parser strategies in priority order
pub const SEGMENT_PARSERS: [(&str, SegmentParser); 2] = [
    ("timestamped", parse_timestamped),
    ("labeled", parse_labeled),
];

/// Output of segmentation
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Segments in document order
    pub segments: Vec<Segment>,
    /// Rep name: the hint when it was real, else the inferred name, else the default
    pub rep_name: String,
    /// Company from the transcript header, if any
    pub company_name: Option<String>,
    /// Name of the parser strategy that produced the segments
    pub parser: Option<&'static str>,
}

/// Segment raw transcript text and infer rep and company
///
/// Tries each parser strategy in order until one yields segments. When the
/// rep hint is a placeholder the rep is inferred; every segment spoken by the
/// resulting rep is then promoted to `Speaker::Rep`.
pub fn segment(raw_text: &str, rep_name_hint: &str, config: &SegmenterConfig) -> Segmentation {
    let placeholder = is_placeholder_rep(rep_name_hint);
    let rep_hint = (!placeholder).then(|| rep_name_hint.trim());

    let lines: Vec<&str> = raw_text.trim().lines().map(str::trim_end).collect();

    let mut segments = Vec::new();
    let mut parser = None;
    for (name, parse) in SEGMENT_PARSERS {
        segments = parse(&lines, rep_hint, config);
        if !segments.is_empty() {
            parser = Some(name);
            break;
        }
    }

    let company_name = infer_company(raw_text);

    let rep_name = match rep_hint {
        Some(hint) => hint.to_string(),
        None => infer_rep_name(&segments, raw_text, config)
            .unwrap_or_else(|| DEFAULT_REP_NAME.to_string()),
    };

    let promoted = retag_rep_segments(&mut segments, &rep_name);

    debug!(
        "Segmented {} segments via {:?}; rep {:?} ({} promoted), company {:?}",
        segments.len(),
        parser,
        rep_name,
        promoted,
        company_name
    );

    Segmentation {
        segments,
        rep_name,
        company_name,
        parser,
    }
}

/// Caller-supplied metadata for a transcript built from text
#[derive(Debug, Clone, Default)]
pub struct TextTranscriptOptions {
    /// Rep name, or a placeholder to have it inferred
    pub rep_name: Option<String>,
    pub call_date: Option<NaiveDateTime>,
    /// Overrides the company inferred from the text
    pub company_name: Option<String>,
    pub call_type: Option<String>,
    /// File name or other source label, used to derive the call id
    pub source_name: Option<String>,
}

/// Build a transcript from raw text
///
/// Segments the text, fills metadata from the options and inference, and
/// keeps the raw text only if no segments were found.
pub fn build_transcript(
    raw_text: &str,
    options: TextTranscriptOptions,
    config: &SegmenterConfig,
) -> Transcript {
    let hint = options.rep_name.as_deref().unwrap_or(DEFAULT_REP_NAME);
    let segmentation = segment(raw_text, hint, config);

    let call_id = match options.source_name.as_deref() {
        Some(source) => call_id_from_source(source),
        None => random_call_id(),
    };
    let call_date = options
        .call_date
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    let mut metadata = CallMetadata::new(call_id, call_date);
    metadata.rep_name = segmentation.rep_name;
    metadata.company_name = options
        .company_name
        .filter(|c| !c.trim().is_empty())
        .or(segmentation.company_name);
    metadata.call_type = options.call_type;

    Transcript::from_parts(metadata, segmentation.segments, raw_text.to_string())
}

/// Call id from a source label: dots become underscores, at most 20 chars
pub fn call_id_from_source(source: &str) -> String {
    source.replace('.', "_").chars().take(20).collect()
}

/// Random 8-character call id
pub fn random_call_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
