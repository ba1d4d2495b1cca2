use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Rep name used when nothing better is known
pub const DEFAULT_REP_NAME: &str = "Unknown Rep";

/// Who is speaking in a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Rep,
    Prospect,
    #[default]
    Unknown,
}

impl Speaker {
    /// Upper-case tag used when a segment has no speaker name
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Rep => "REP",
            Speaker::Prospect => "PROSPECT",
            Speaker::Unknown => "UNKNOWN",
        }
    }

    /// Lenient parse; anything unrecognized is `Unknown`
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "rep" => Speaker::Rep,
            "prospect" => Speaker::Prospect,
            _ => Speaker::Unknown,
        }
    }
}

/// One attributed utterance within a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Speaker role; may be promoted to `Rep` after rep inference
    pub speaker: Speaker,
    /// Name of the speaker if known
    pub speaker_name: Option<String>,
    /// The spoken text
    pub text: String,
    /// Start time in seconds from call start
    pub start_time: Option<f64>,
    /// End time in seconds from call start
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Literal timestamp from the source (HH:MM:SS)
    #[serde(default)]
    pub timestamp_str: Option<String>,
}

impl Segment {
    pub fn new(speaker: Speaker, speaker_name: Option<String>, text: impl Into<String>) -> Self {
        Self {
            speaker,
            speaker_name,
            text: text.into(),
            start_time: None,
            end_time: None,
            timestamp_str: None,
        }
    }

    /// Attach a start time and its literal source timestamp
    pub fn at(mut self, start_time: f64, timestamp_str: impl Into<String>) -> Self {
        self.start_time = Some(start_time);
        self.timestamp_str = Some(timestamp_str.into());
        self
    }

    /// Start time formatted as MM:SS
    pub fn timestamp(&self) -> Option<String> {
        self.start_time.map(|t| {
            let total = t.max(0.0) as u64;
            format!("{:02}:{:02}", total / 60, total % 60)
        })
    }

    /// Best-effort display timestamp, preferring the literal source value
    pub fn timestamp_display(&self) -> Option<String> {
        self.timestamp_str.clone().or_else(|| self.timestamp())
    }

    /// Label used when rendering: the speaker name, else the role tag
    pub fn speaker_label(&self) -> &str {
        self.speaker_name.as_deref().unwrap_or(self.speaker.label())
    }

    /// Whether the speaker name matches `name`, ignoring case and outer whitespace
    pub fn is_spoken_by(&self, name: &str) -> bool {
        self.speaker_name
            .as_deref()
            .is_some_and(|n| n.trim().to_lowercase() == name.trim().to_lowercase())
    }
}

/// Metadata about a sales call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub call_id: String,
    pub call_date: NaiveDateTime,
    pub rep_name: String,
    #[serde(default)]
    pub rep_email: Option<String>,
    #[serde(default)]
    pub prospect_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub call_duration_seconds: Option<u64>,
    /// Discovery, demo, follow-up, ...
    #[serde(default)]
    pub call_type: Option<String>,
    #[serde(default)]
    pub deal_stage: Option<String>,
}

impl CallMetadata {
    pub fn new(call_id: impl Into<String>, call_date: NaiveDateTime) -> Self {
        Self {
            call_id: call_id.into(),
            call_date,
            rep_name: DEFAULT_REP_NAME.to_string(),
            rep_email: None,
            prospect_name: None,
            company_name: None,
            call_duration_seconds: None,
            call_type: None,
            deal_stage: None,
        }
    }

    /// Call date as YYYY-MM-DD
    pub fn call_date_formatted(&self) -> String {
        self.call_date.format("%Y-%m-%d").to_string()
    }

    /// Duration as "{m}m {s}s"
    pub fn duration_formatted(&self) -> Option<String> {
        self.call_duration_seconds
            .map(|secs| format!("{}m {}s", secs / 60, secs % 60))
    }
}

/// A call transcript: metadata plus ordered segments
///
/// When segmentation produced segments the raw text is not retained; the
/// full text is rebuilt from the segments instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub metadata: CallMetadata,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

impl Transcript {
    /// Build a transcript, keeping `raw_text` only when there are no segments
    pub fn from_parts(metadata: CallMetadata, segments: Vec<Segment>, raw_text: String) -> Self {
        let raw_text = if segments.is_empty() {
            Some(raw_text)
        } else {
            None
        };
        Self {
            metadata,
            segments,
            raw_text,
        }
    }

    /// The complete transcript as text
    pub fn full_text(&self) -> String {
        if let Some(raw) = self.raw_text.as_deref().filter(|r| !r.is_empty()) {
            return raw.to_string();
        }

        self.segments
            .iter()
            .map(|segment| match segment.timestamp_display() {
                Some(ts) => format!("[{}] {}: {}", ts, segment.speaker_label(), segment.text),
                None => format!("{}: {}", segment.speaker_label(), segment.text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn word_count(&self) -> usize {
        self.full_text().split_whitespace().count()
    }
}

/// Transcripts processed together as one batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptCollection {
    pub transcripts: Vec<Transcript>,
    pub date_range_start: Option<NaiveDateTime>,
    pub date_range_end: Option<NaiveDateTime>,
}

impl TranscriptCollection {
    /// Collect transcripts and derive the date range from their call dates
    pub fn new(transcripts: Vec<Transcript>) -> Self {
        let dates = transcripts.iter().map(|t| t.metadata.call_date);
        let date_range_start = dates.clone().min();
        let date_range_end = dates.max();
        Self {
            transcripts,
            date_range_start,
            date_range_end,
        }
    }

    pub fn total_calls(&self) -> usize {
        self.transcripts.len()
    }

    /// Unique rep names, sorted
    pub fn reps(&self) -> Vec<String> {
        let mut reps: Vec<String> = self
            .transcripts
            .iter()
            .map(|t| t.metadata.rep_name.clone())
            .collect();
        reps.sort();
        reps.dedup();
        reps
    }

    /// Unique company names, sorted
    pub fn companies(&self) -> Vec<String> {
        let mut companies: Vec<String> = self
            .transcripts
            .iter()
            .filter_map(|t| t.metadata.company_name.clone())
            .collect();
        companies.sort();
        companies.dedup();
        companies
    }
}
