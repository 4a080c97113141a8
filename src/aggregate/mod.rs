//! Aggregation: from resolved tracks to one performance fact per song
//! per show.
//!
//! Order matters here. Deduplication picks one recording per show,
//! sandwich detection rewrites durations within each selected recording,
//! and only then are facts materialized. Flagging outliers before this
//! aggregation is a known bug class: partial segments look like false
//! anomalies next to full performances.

pub mod coverage;
pub mod dedup;
pub mod sandwich;

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::db::models::Track;
use crate::db::{Database, Result};

/// Counts reported by one aggregation pass.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub shows: usize,
    pub recordings_skipped: usize,
    pub sandwiches: usize,
    pub facts: usize,
    pub facts_eligible: usize,
}

/// Run deduplication, sandwich detection, and fact materialization.
///
/// Sandwich detection is independent per recording, so it fans out over
/// the rayon pool; all database writes stay on the calling thread.
pub fn build_facts(db: &Database) -> Result<AggregateReport> {
    let mut report = AggregateReport::default();

    let interludes: HashSet<i64> = db
        .all_songs()?
        .into_iter()
        .filter(|s| s.song_type == "interlude")
        .map(|s| s.id)
        .collect();

    let recordings = db.all_recordings()?;
    let mut tracklists: HashMap<i64, Vec<Track>> = HashMap::new();
    let mut totals: HashMap<i64, f64> = HashMap::new();
    for rec in &recordings {
        let tracks = db.tracks_for_recording(rec.id)?;
        let total = tracks
            .iter()
            .filter(|t| t.song_id.is_some())
            .filter_map(|t| t.duration_seconds)
            .sum();
        totals.insert(rec.id, total);
        tracklists.insert(rec.id, tracks);
    }

    let selected = dedup::select_recordings(&recordings, &totals);
    report.shows = selected.len();
    report.recordings_skipped = recordings.len() - selected.len();
    log::info!(
        "{} shows selected from {} recordings",
        report.shows,
        recordings.len()
    );

    // Detect in parallel, write serially.
    let mut detections: Vec<(i64, Vec<sandwich::Sandwich>)> = selected
        .par_iter()
        .map(|&rec_id| (rec_id, sandwich::detect(&tracklists[&rec_id], &interludes)))
        .collect();
    detections.sort_unstable_by_key(|(rec_id, _)| *rec_id);
    for (_, sandwiches) in &detections {
        for s in sandwiches {
            db.set_sandwich_duration(s.first_track, s.combined)?;
            for &track_id in &s.zeroed {
                db.set_sandwich_duration(track_id, 0.0)?;
            }
            report.sandwiches += 1;
        }
    }

    // Materialize facts: one per (song, selected recording), MAX over the
    // song's effective segment durations. Tracks with no duration at all
    // contribute nothing rather than a zero.
    let by_id: HashMap<i64, _> = recordings.iter().map(|r| (r.id, r)).collect();
    for rec_id in selected {
        let rec = by_id[&rec_id];
        let show_date = rec.show_date.as_deref().unwrap_or_default();
        let eligible = coverage::is_timing_eligible(rec.coverage);

        let tracks = db.tracks_for_recording(rec_id)?;
        let mut per_song: HashMap<i64, (f64, i64)> = HashMap::new();
        let mut order: Vec<i64> = Vec::new();
        for t in &tracks {
            let Some(song_id) = t.song_id else { continue };
            let Some(effective) = t.sandwich_duration.or(t.duration_seconds) else {
                continue;
            };
            let entry = per_song.entry(song_id).or_insert_with(|| {
                order.push(song_id);
                (effective, 0)
            });
            entry.0 = entry.0.max(effective);
            entry.1 += 1;
        }
        for song_id in order {
            let (duration, segments) = per_song[&song_id];
            db.insert_fact(song_id, show_date, rec_id, duration, segments, eligible)?;
            report.facts += 1;
            if eligible {
                report.facts_eligible += 1;
            }
        }
    }
    log::info!(
        "{} facts ({} eligible), {} sandwiches",
        report.facts,
        report.facts_eligible,
        report.sandwiches
    );
    Ok(report)
}
