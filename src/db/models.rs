use serde::{Deserialize, Serialize};

/// Which external source produced a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    PrimaryTextSource,
    StructuredMetadataSource,
    ArchivalAudioSource,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryTextSource => "primary_text_source",
            Self::StructuredMetadataSource => "structured_metadata_source",
            Self::ArchivalAudioSource => "archival_audio_source",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "primary_text_source" => Some(Self::PrimaryTextSource),
            "structured_metadata_source" => Some(Self::StructuredMetadataSource),
            "archival_audio_source" => Some(Self::ArchivalAudioSource),
            _ => None,
        }
    }
}

/// Per-recording trust tier for timing accuracy.
///
/// `complete` — full unedited show, best timing data.
/// `unedited` — songs unedited but release is not a complete show.
/// `edited`   — songs may be trimmed/overdubbed/faded.
/// `unknown`  — not yet classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Complete,
    Unedited,
    Edited,
    Unknown,
}

impl Coverage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Unedited => "unedited",
            Self::Edited => "edited",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "complete" => Self::Complete,
            "unedited" => Self::Unedited,
            "edited" => Self::Edited,
            _ => Self::Unknown,
        }
    }
}

/// Data for inserting a recording (ingest phase).
pub struct NewRecording {
    pub source_type: SourceType,
    pub source_id: String,
    pub title: Option<String>,
    pub show_date: Option<String>,
    pub venue: Option<String>,
    pub region: Option<String>,
    pub trust_rank: i64,
    pub coverage: Coverage,
}

/// Data for inserting a track (ingest phase).
pub struct NewTrack {
    pub recording_id: i64,
    pub position: i64,
    pub raw_title: String,
    pub duration_seconds: Option<f64>,
    pub segue_flag: bool,
}

/// A recording row read from the database.
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: i64,
    pub source_type: String,
    pub source_id: String,
    pub show_date: Option<String>,
    pub venue: Option<String>,
    pub trust_rank: i64,
    pub coverage: Coverage,
}

/// A track row read from the database, with derived fields.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: i64,
    pub recording_id: i64,
    pub position: i64,
    pub raw_title: String,
    pub duration_seconds: Option<f64>,
    pub segue_flag: bool,
    pub song_id: Option<i64>,
    pub is_non_song: bool,
    pub sandwich_duration: Option<f64>,
}

/// A canonical song identity.
#[derive(Debug, Clone)]
pub struct Song {
    pub id: i64,
    pub canonical_name: String,
    pub song_type: String,
}

/// The pipeline's output unit: one performance of one song at one show.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceFact {
    pub song_id: i64,
    pub song: String,
    pub show_date: String,
    pub recording_id: i64,
    pub duration_seconds: f64,
    pub segment_count: i64,
    pub is_outlier: bool,
    pub eligible: bool,
}

/// An ambiguous resolution awaiting operator triage.
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    pub id: i64,
    pub raw_title: String,
    pub cleaned: String,
    pub song_id: Option<i64>,
    pub similarity: Option<f64>,
    pub reason: String,
}

/// Per-song duration statistics computed by the analyze pass.
#[derive(Debug, Clone)]
pub struct SongStats {
    pub times_played: i64,
    pub mean_duration: f64,
    pub median_duration: f64,
    pub std_duration: f64,
    pub first_played: Option<String>,
    pub last_played: Option<String>,
}

/// Database-wide counts for the status command.
#[derive(Debug)]
pub struct DbStats {
    pub songs: i64,
    pub aliases: i64,
    pub recordings: i64,
    pub tracks: i64,
    pub tracks_with_duration: i64,
    pub unmatched_tracks: i64,
    pub facts: i64,
    pub review_pending: i64,
    pub by_source: Vec<(String, i64)>,
    pub by_coverage: Vec<(String, i64)>,
}
