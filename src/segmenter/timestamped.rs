use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Segment, Speaker};

use super::SegmenterConfig;

/// `HH:MM:SS` optionally followed by a speaker name on the same line
fn timestamp_line_regex() -> &'static Regex {
    static TIMESTAMP_LINE_RE: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP_LINE_RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<h>\d{2}):(?P<m>\d{2}):(?P<s>\d{2})(?:\s+(?P<speaker>.+?))?\s*$")
            .expect("timestamp line regex must compile")
    })
}

/// Section headers that show up inside exported transcripts
fn header_line_regex() -> &'static Regex {
    static HEADER_LINE_RE: OnceLock<Regex> = OnceLock::new();
    HEADER_LINE_RE.get_or_init(|| {
        Regex::new(r"(?i)^(meeting transcript|participants\s*:|transcript)$")
            .expect("header line regex must compile")
    })
}

/// Parse a timestamped export (Meet/Teams style)
///
/// Only applies when the first non-blank line is a timestamp. Each timestamp
/// opens a block; the speaker is inline or on the next non-blank line, and
/// the message is every following non-header line up to the next timestamp,
/// joined with single spaces. Blocks without a speaker or message are dropped.
pub fn parse_timestamped(
    lines: &[&str],
    rep_hint: Option<&str>,
    _config: &SegmenterConfig,
) -> Vec<Segment> {
    let timestamp_re = timestamp_line_regex();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }

        let Some(caps) = timestamp_re.captures(line) else {
            break;
        };

        let hours: u32 = caps["h"].parse().unwrap_or(0);
        let minutes: u32 = caps["m"].parse().unwrap_or(0);
        let seconds: u32 = caps["s"].parse().unwrap_or(0);
        let start_time = f64::from(hours * 3600 + minutes * 60 + seconds);
        let timestamp_str = format!("{:02}:{:02}:{:02}", hours, minutes, seconds);

        let mut speaker_name = caps
            .name("speaker")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        // Speaker on its own line after the timestamp
        if speaker_name.is_none() {
            let mut j = i + 1;
            while j < lines.len() && lines[j].trim().is_empty() {
                j += 1;
            }
            if j < lines.len() {
                speaker_name = Some(lines[j].trim().to_string());
                i = j;
            }
        }

        let mut message_lines = Vec::new();
        i += 1;
        while i < lines.len() {
            let next = lines[i].trim();
            if next.is_empty() || header_line_regex().is_match(next) {
                i += 1;
                continue;
            }
            if timestamp_re.is_match(next) {
                break;
            }
            message_lines.push(next);
            i += 1;
        }

        let message = message_lines.join(" ");
        if let Some(name) = speaker_name.filter(|_| !message.is_empty()) {
            let speaker = match rep_hint {
                Some(hint) if name.to_lowercase() == hint.to_lowercase() => Speaker::Rep,
                _ => Speaker::Unknown,
            };
            segments.push(Segment::new(speaker, Some(name), message).at(start_time, timestamp_str));
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, hint: Option<&str>) -> Vec<Segment> {
        let lines: Vec<&str> = text.lines().collect();
        parse_timestamped(&lines, hint, &SegmenterConfig::default())
    }

    #[test]
    fn test_inline_speaker_blocks() {
        let text = "00:00:05 Rachel Martinez\nThanks for joining today.\nLet's get started.\n\n00:01:10 Tom Becker\nHappy to be here.";
        let segments = parse(text, Some("rachel martinez"));

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, Speaker::Rep);
        assert_eq!(segments[0].speaker_name.as_deref(), Some("Rachel Martinez"));
        assert_eq!(segments[0].text, "Thanks for joining today. Let's get started.");
        assert_eq!(segments[0].start_time, Some(5.0));
        assert_eq!(segments[0].timestamp_str.as_deref(), Some("00:00:05"));

        assert_eq!(segments[1].speaker, Speaker::Unknown);
        assert_eq!(segments[1].start_time, Some(70.0));
    }

    #[test]
    fn test_speaker_on_following_line() {
        let text = "01:02:03\n\nTom Becker\nWe need SSO.\nTranscript\n00:00:10\nRachel\nNoted.";
        let segments = parse(text, None);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker_name.as_deref(), Some("Tom Becker"));
        assert_eq!(segments[0].text, "We need SSO.");
        assert_eq!(segments[0].start_time, Some(3723.0));
        assert_eq!(segments[0].speaker, Speaker::Unknown);
        assert_eq!(segments[1].speaker_name.as_deref(), Some("Rachel"));
    }

    #[test]
    fn test_not_timestamped_when_first_line_is_text() {
        let text = "Meeting: Acme - Demo\n00:00:05 Rachel\nHello";
        assert!(parse(text, None).is_empty());
    }

    #[test]
    fn test_drops_blocks_without_message() {
        let text = "00:00:05 Rachel\n00:00:09 Tom\nHi Rachel";
        let segments = parse(text, None);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker_name.as_deref(), Some("Tom"));
    }

    #[test]
    fn test_never_tags_prospect() {
        let text = "00:00:05 Customer\nWe are evaluating vendors.";
        let segments = parse(text, None);
        assert_eq!(segments[0].speaker, Speaker::Unknown);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("", None).is_empty());
        assert!(parse("\n\n  \n", None).is_empty());
    }
}
