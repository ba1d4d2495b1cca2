use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Segment, Speaker};

use super::SegmenterConfig;

fn meeting_line_regex() -> &'static Regex {
    static MEETING_LINE_RE: OnceLock<Regex> = OnceLock::new();
    MEETING_LINE_RE.get_or_init(|| {
        Regex::new(r"(?im)^\s*Meeting:\s*(.+?)\s*$").expect("meeting line regex must compile")
    })
}

fn participant_line_regex() -> &'static Regex {
    static PARTICIPANT_LINE_RE: OnceLock<Regex> = OnceLock::new();
    PARTICIPANT_LINE_RE.get_or_init(|| {
        Regex::new(
            r"^\s*[-•]\s*(?P<name>.+?)(?:\s*\((?P<role>.+?)\))?\s*-\s*(?P<email>\S+@\S+)\s*$",
        )
        .expect("participant line regex must compile")
    })
}

fn participants_header_regex() -> &'static Regex {
    static PARTICIPANTS_HEADER_RE: OnceLock<Regex> = OnceLock::new();
    PARTICIPANTS_HEADER_RE.get_or_init(|| {
        Regex::new(r"(?i)^participants\s*:\s*$").expect("participants header regex must compile")
    })
}

fn transcript_header_regex() -> &'static Regex {
    static TRANSCRIPT_HEADER_RE: OnceLock<Regex> = OnceLock::new();
    TRANSCRIPT_HEADER_RE.get_or_init(|| {
        Regex::new(r"(?i)^transcript\s*$").expect("transcript header regex must compile")
    })
}

/// Whether a caller-supplied rep name is a stand-in rather than a real name
///
/// Covers empty input, "Unknown Rep", "unknown", "n/a", "na", "none", "meeting",
/// "call", and short phrases like "Sales Meeting".
pub fn is_placeholder_rep(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return true;
    }
    if matches!(
        name.as_str(),
        "unknown rep" | "unknown" | "n/a" | "na" | "none" | "meeting" | "call"
    ) {
        return true;
    }
    name.contains("meeting") && name.split_whitespace().count() <= 2
}

/// Company from a `Meeting: <company> - <title>` header line
pub fn infer_company(text: &str) -> Option<String> {
    let caps = meeting_line_regex().captures(text)?;
    let meeting = caps.get(1)?.as_str().trim();
    let company = match meeting.split_once(" - ") {
        Some((before, _)) => before.trim(),
        None => meeting,
    };
    (!company.is_empty()).then(|| company.to_string())
}

/// Rep from a `Participants:` section
///
/// Scans lines between the `Participants:` header and the `Transcript`
/// header, shaped like `- Name (Role) - email@domain`. Picks the first
/// participant on the organization's domain whose role is empty or matches
/// an internal role keyword.
pub fn infer_rep_from_participants(text: &str, config: &SegmenterConfig) -> Option<String> {
    let domain_suffix = format!("@{}", config.internal_email_domain.to_lowercase());
    let mut in_participants = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if participants_header_regex().is_match(line) {
            in_participants = true;
            continue;
        }
        if !in_participants {
            continue;
        }
        if transcript_header_regex().is_match(line) {
            break;
        }

        let Some(caps) = participant_line_regex().captures(line) else {
            continue;
        };

        let name = caps.name("name").map_or("", |m| m.as_str().trim());
        let role = caps
            .name("role")
            .map_or(String::new(), |m| m.as_str().trim().to_lowercase());
        let email = caps
            .name("email")
            .map_or(String::new(), |m| m.as_str().trim().to_lowercase());

        if name.is_empty() || !email.ends_with(&domain_suffix) {
            continue;
        }

        let internal_role = role.is_empty()
            || config
                .internal_role_keywords
                .iter()
                .any(|k| role.contains(k.as_str()));
        if internal_role {
            return Some(name.to_string());
        }
    }

    None
}

/// Infer the rep's name when the caller only gave a placeholder
///
/// Priority: first rep-tagged segment with a name, then the participants
/// section, then the first named speaker.
pub fn infer_rep_name(segments: &[Segment], text: &str, config: &SegmenterConfig) -> Option<String> {
    segments
        .iter()
        .find(|s| s.speaker == Speaker::Rep && s.speaker_name.is_some())
        .and_then(|s| s.speaker_name.clone())
        .or_else(|| infer_rep_from_participants(text, config))
        .or_else(|| segments.iter().find_map(|s| s.speaker_name.clone()))
}

/// Promote every segment spoken by `rep_name` to `Speaker::Rep`
///
/// Returns how many segments changed; running it again changes nothing.
pub fn retag_rep_segments(segments: &mut [Segment], rep_name: &str) -> usize {
    let mut changed = 0;
    for segment in segments.iter_mut() {
        if segment.speaker != Speaker::Rep && segment.is_spoken_by(rep_name) {
            segment.speaker = Speaker::Rep;
            changed += 1;
        }
    }
    changed
}
