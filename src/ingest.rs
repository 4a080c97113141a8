//! Ingest of scraped recording exports.
//!
//! Walks a directory of JSON files, each holding one recording (or an
//! array of them) with its ordered tracklist, and loads them into
//! storage. Ingest is append-only and keyed on the source-specific
//! recording id: re-ingesting the same export is a no-op.
//!
//! Nothing here is fatal to the run. A malformed file or record is
//! logged and skipped; the rest of the batch loads normally.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::config::CoverageRules;
use crate::db::Database;
use crate::db::models::{Coverage, NewRecording, NewTrack, SourceType};

#[derive(Debug, Deserialize)]
struct TrackRecord {
    raw_title: String,
    position: i64,
    duration_seconds: Option<f64>,
    #[serde(default)]
    segue_flag: bool,
}

#[derive(Debug, Deserialize)]
struct RecordingRecord {
    recording_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    show_date: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    region: Option<String>,
    source_type: SourceType,
    trust_rank: i64,
    #[serde(default = "unknown_coverage")]
    coverage: Coverage,
    tracks: Vec<TrackRecord>,
}

fn unknown_coverage() -> Coverage {
    Coverage::Unknown
}

// A file is either one recording or a batch of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Export {
    Many(Vec<RecordingRecord>),
    One(Box<RecordingRecord>),
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub files: usize,
    pub files_skipped: usize,
    pub recordings: usize,
    pub duplicates: usize,
    pub tracks: usize,
}

/// Load every `.json` file under `dir`. One transaction for the whole
/// batch: partial ingests would make later runs depend on which half of
/// a crashed batch made it in.
pub fn ingest_dir(db: &Database, dir: &Path, rules: &CoverageRules) -> Result<IngestReport> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    if files.is_empty() {
        anyhow::bail!("no .json files under {}", dir.display());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut report = IngestReport::default();
    let tx = db.conn.unchecked_transaction()?;
    for path in &files {
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        match ingest_file(db, path, rules, &mut report) {
            Ok(()) => report.files += 1,
            Err(e) => {
                log::error!("skipping {}: {e:#}", path.display());
                report.files_skipped += 1;
            }
        }
        pb.inc(1);
    }
    tx.commit()?;
    pb.finish_and_clear();
    log::info!(
        "ingested {} recordings ({} duplicate), {} tracks from {} files",
        report.recordings,
        report.duplicates,
        report.tracks,
        report.files
    );
    Ok(report)
}

fn ingest_file(
    db: &Database,
    path: &Path,
    rules: &CoverageRules,
    report: &mut IngestReport,
) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let export: Export = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    let records = match export {
        Export::Many(v) => v,
        Export::One(r) => vec![*r],
    };
    for record in records {
        ingest_record(db, record, rules, report)?;
    }
    Ok(())
}

fn ingest_record(
    db: &Database,
    record: RecordingRecord,
    rules: &CoverageRules,
    report: &mut IngestReport,
) -> Result<()> {
    // An unparseable date is worse than no date: a recording without one
    // is simply never keyed to a show, while a wrong one corrupts stats.
    let show_date = match record.show_date.as_deref() {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d.format("%Y-%m-%d").to_string()),
            Err(_) => {
                log::warn!("{}: unparseable show date {raw:?}, storing none", record.recording_id);
                None
            }
        },
        None => None,
    };

    let coverage = rules.resolve(&record.recording_id, record.source_type, record.coverage);
    let new = NewRecording {
        source_type: record.source_type,
        source_id: record.recording_id.clone(),
        title: record.title,
        show_date,
        venue: record.venue,
        region: record.region,
        trust_rank: record.trust_rank,
        coverage,
    };
    let Some(recording_id) = db.insert_recording(&new)? else {
        log::debug!("{} already ingested", record.recording_id);
        report.duplicates += 1;
        return Ok(());
    };
    report.recordings += 1;

    for track in record.tracks {
        // Negative durations are scrape garbage, not short songs
        let duration = track.duration_seconds.filter(|d| *d > 0.0);
        db.insert_track(&NewTrack {
            recording_id,
            position: track.position,
            raw_title: track.raw_title,
            duration_seconds: duration,
            segue_flag: track.segue_flag,
        })?;
        report.tracks += 1;
    }
    Ok(())
}
