use crate::models::{Segment, Speaker};

use super::SegmenterConfig;

/// Parse plain `Label: text` lines
///
/// The label (case-folded) is classified as rep if it contains a rep keyword
/// or the rep hint, as prospect if it contains a prospect keyword, and as a
/// bare speaker name if it is short enough. Lines without a colon, with an
/// empty message, or with a long unmatched label are skipped.
pub fn parse_labeled(lines: &[&str], rep_hint: Option<&str>, config: &SegmenterConfig) -> Vec<Segment> {
    let rep_hint = rep_hint.map(str::to_lowercase).filter(|h| !h.is_empty());
    let mut segments = Vec::new();

    for line in lines {
        let line = line.trim();
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };

        let content = rest.trim();
        if content.is_empty() {
            continue;
        }

        let label = label.trim().to_lowercase();
        let Some(speaker) = classify_label(&label, rep_hint.as_deref(), config) else {
            continue;
        };

        segments.push(Segment::new(speaker, Some(title_case(&label)), content));
    }

    segments
}

/// Classify a lower-cased label, or `None` when it does not look like a speaker
fn classify_label(label: &str, rep_hint: Option<&str>, config: &SegmenterConfig) -> Option<Speaker> {
    let is_rep = config.rep_keywords.iter().any(|k| label.contains(k.as_str()))
        || rep_hint.is_some_and(|hint| label.contains(hint));
    if is_rep {
        return Some(Speaker::Rep);
    }

    if config.prospect_keywords.iter().any(|k| label.contains(k.as_str())) {
        return Some(Speaker::Prospect);
    }

    if label.split_whitespace().count() <= config.max_name_words {
        return Some(Speaker::Unknown);
    }

    None
}

/// Capitalize the first letter of every alphabetic run, lower-case the rest
pub(crate) fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            result.push(c);
            previous_alpha = false;
        }
    }
    result
}
