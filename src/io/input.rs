use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{
    CallMetadata, DEFAULT_REP_NAME, Segment, Speaker, Transcript, TranscriptCollection,
};
use crate::segmenter::{
    SegmenterConfig, TextTranscriptOptions, build_transcript, infer_rep_name,
    is_placeholder_rep, random_call_id, retag_rep_segments,
};

/// Load a single transcript file, picking the format from the extension
///
/// `.txt` and `.md` are segmented from raw text; `.json` is the structured
/// transcript shape. The options fill in metadata the file doesn't carry.
pub fn load_transcript_file(
    path: &Path,
    options: TextTranscriptOptions,
    config: &SegmenterConfig,
) -> Result<Transcript> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    let transcript = match extension.as_str() {
        "txt" | "md" => {
            let options = TextTranscriptOptions {
                source_name: options
                    .source_name
                    .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned())),
                ..options
            };
            build_transcript(&content, options, config)
        }
        "json" => parse_transcript_json(&content, options, config)
            .with_context(|| format!("Failed to parse transcript JSON: {:?}", path))?,
        other => bail!("Unsupported file type {:?}: expected .txt, .md or .json", other),
    };

    info!(
        "Loaded {} ({} segments, rep {})",
        transcript.metadata.call_id,
        transcript.segments.len(),
        transcript.metadata.rep_name
    );

    Ok(transcript)
}

/// Load several files into a collection, skipping any that fail
pub fn load_collection(
    paths: &[impl AsRef<Path>],
    options: &TextTranscriptOptions,
    config: &SegmenterConfig,
) -> TranscriptCollection {
    let mut transcripts = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match load_transcript_file(path, options.clone(), config) {
            Ok(transcript) => transcripts.push(transcript),
            Err(e) => warn!("Skipping {:?}: {:#}", path, e),
        }
    }
    TranscriptCollection::new(transcripts)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TranscriptJson {
    metadata: MetadataJson,
    segments: Vec<SegmentJson>,
    raw_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetadataJson {
    call_id: Option<String>,
    call_date: Option<String>,
    rep_name: Option<String>,
    rep_email: Option<String>,
    prospect_name: Option<String>,
    company_name: Option<String>,
    call_duration_seconds: Option<u64>,
    call_type: Option<String>,
    deal_stage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SegmentJson {
    speaker: Option<String>,
    speaker_name: Option<String>,
    text: String,
    start_time: Option<f64>,
    end_time: Option<f64>,
    timestamp_str: Option<String>,
}

/// Parse the structured transcript shape
///
/// Unknown speaker strings become `Unknown`, a missing call id is random, a
/// missing or unreadable date is now, and a placeholder rep is inferred from
/// the segments.
pub fn parse_transcript_json(
    json: &str,
    options: TextTranscriptOptions,
    config: &SegmenterConfig,
) -> Result<Transcript> {
    let data: TranscriptJson = serde_json::from_str(json).context("Invalid transcript JSON")?;
    let meta = data.metadata;

    let call_date = match meta.call_date.as_deref() {
        Some(value) => parse_call_date(value).unwrap_or_else(|| {
            warn!("Unreadable call_date {:?}, using now", value);
            Local::now().naive_local()
        }),
        None => options
            .call_date
            .unwrap_or_else(|| Local::now().naive_local()),
    };

    let mut segments: Vec<Segment> = data
        .segments
        .into_iter()
        .map(|s| Segment {
            speaker: s.speaker.as_deref().map(Speaker::from_label).unwrap_or_default(),
            speaker_name: s.speaker_name,
            text: s.text,
            start_time: s.start_time,
            end_time: s.end_time,
            timestamp_str: s.timestamp_str,
        })
        .collect();

    let raw_text = data.raw_text.unwrap_or_default();

    let rep_name = meta
        .rep_name
        .or(options.rep_name)
        .filter(|r| !is_placeholder_rep(r))
        .or_else(|| infer_rep_name(&segments, &raw_text, config))
        .unwrap_or_else(|| DEFAULT_REP_NAME.to_string());
    retag_rep_segments(&mut segments, &rep_name);

    let mut metadata = CallMetadata::new(meta.call_id.unwrap_or_else(random_call_id), call_date);
    metadata.rep_name = rep_name;
    metadata.rep_email = meta.rep_email;
    metadata.prospect_name = meta.prospect_name;
    metadata.company_name = meta.company_name.or(options.company_name);
    metadata.call_duration_seconds = meta.call_duration_seconds;
    metadata.call_type = meta.call_type.or(options.call_type);
    metadata.deal_stage = meta.deal_stage;

    Ok(Transcript::from_parts(metadata, segments, raw_text))
}

/// Accepts ISO date-times (with or without fractional seconds) and bare dates
fn parse_call_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_text_file() {
        let file = temp_file(
            ".txt",
            "Meeting: Acme Corp - Discovery\nSales Rep: How do you report today?\nProspect: Spreadsheets.",
        );
        let transcript =
            load_transcript_file(file.path(), TextTranscriptOptions::default(), &SegmenterConfig::default())
                .unwrap();

        assert_eq!(transcript.metadata.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(transcript.metadata.rep_name, "Sales Rep");
        assert_eq!(transcript.segments.len(), 3);
        // Call id comes from the file name
        let expected: String = file
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .replace('.', "_")
            .chars()
            .take(20)
            .collect();
        assert_eq!(transcript.metadata.call_id, expected);
    }

    #[test]
    fn test_load_json_file() {
        let json = r#"{
            "metadata": {
                "call_id": "CALL-001",
                "call_date": "2024-12-18T10:30:00",
                "rep_name": "Sarah Johnson",
                "company_name": "Acme Corp",
                "call_duration_seconds": 1800
            },
            "segments": [
                {"speaker": "REP", "speaker_name": "Sarah Johnson", "text": "Thanks for joining.", "start_time": 0.0, "end_time": 4.5},
                {"speaker": "narrator", "text": "We need better reporting.", "start_time": 5.0}
            ]
        }"#;
        let file = temp_file(".json", json);
        let transcript =
            load_transcript_file(file.path(), TextTranscriptOptions::default(), &SegmenterConfig::default())
                .unwrap();

        assert_eq!(transcript.metadata.call_id, "CALL-001");
        assert_eq!(transcript.metadata.call_date_formatted(), "2024-12-18");
        assert_eq!(transcript.metadata.rep_name, "Sarah Johnson");
        assert_eq!(transcript.metadata.call_duration_seconds, Some(1800));
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].speaker, Speaker::Rep);
        assert_eq!(transcript.segments[0].end_time, Some(4.5));
        assert_eq!(transcript.segments[1].speaker, Speaker::Unknown);
        assert!(transcript.raw_text.is_none());
    }

    #[test]
    fn test_json_lenient_defaults() {
        let json = r#"{"segments": [{"speaker_name": "Dana", "text": "Hello"}]}"#;
        let transcript =
            parse_transcript_json(json, TextTranscriptOptions::default(), &SegmenterConfig::default())
                .unwrap();

        assert_eq!(transcript.metadata.call_id.len(), 8);
        // Placeholder rep falls back to the first named speaker
        assert_eq!(transcript.metadata.rep_name, "Dana");
        assert_eq!(transcript.segments[0].speaker, Speaker::Rep);

        let empty = parse_transcript_json("{}", TextTranscriptOptions::default(), &SegmenterConfig::default())
            .unwrap();
        assert_eq!(empty.metadata.rep_name, DEFAULT_REP_NAME);
        assert!(empty.segments.is_empty());
    }

    #[test]
    fn test_parse_call_date_formats() {
        assert!(parse_call_date("2024-12-18T10:30:00").is_some());
        assert!(parse_call_date("2024-12-18T10:30:00.250").is_some());
        assert!(parse_call_date("2024-12-18 10:30:00").is_some());
        assert_eq!(
            parse_call_date("2024-12-18"),
            NaiveDate::from_ymd_opt(2024, 12, 18).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(parse_call_date("last tuesday").is_none());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_file(".pdf", "%PDF-1.4");
        let result =
            load_transcript_file(file.path(), TextTranscriptOptions::default(), &SegmenterConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_collection_skips_failures() {
        let good = temp_file(".txt", "Rep: Hi\nCustomer: Hello");
        let bad = temp_file(".csv", "a,b");
        let paths = vec![good.path().to_path_buf(), bad.path().to_path_buf()];

        let collection = load_collection(&paths, &TextTranscriptOptions::default(), &SegmenterConfig::default());
        assert_eq!(collection.total_calls(), 1);
    }
}
