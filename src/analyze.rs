//! Per-song duration statistics and outlier flagging.
//!
//! Runs strictly after aggregation, over statistics-eligible facts only.
//! Outlier flags are advisory: a flagged fact stays in every default
//! view and export, because high-variance songs have legitimate extreme
//! performances.

use crate::config::Thresholds;
use crate::db::models::SongStats;
use crate::db::{Database, Result};

/// Counts reported by one analyze pass.
#[derive(Debug, Default)]
pub struct AnalyzeReport {
    pub songs: usize,
    pub outliers: usize,
}

pub fn analyze(db: &Database, thresholds: &Thresholds) -> Result<AnalyzeReport> {
    let mut report = AnalyzeReport::default();
    for song_id in db.songs_with_eligible_facts()? {
        let facts = db.eligible_facts_for_song(song_id)?;
        let durations: Vec<f64> = facts.iter().map(|&(_, _, d)| d).collect();
        let m = mean(&durations);
        let sd = std_dev(&durations);
        let stats = SongStats {
            times_played: facts.len() as i64,
            mean_duration: m,
            median_duration: median(&durations),
            std_duration: sd,
            // Facts come back ordered by show date
            first_played: facts.first().map(|(_, d, _)| d.clone()),
            last_played: facts.last().map(|(_, d, _)| d.clone()),
        };
        db.update_song_stats(song_id, &stats)?;
        report.songs += 1;

        // Too few samples make every deviation look extreme
        if facts.len() < thresholds.min_samples || sd <= 0.0 {
            continue;
        }
        for (fact_id, _, duration) in &facts {
            if (duration - m).abs() > thresholds.outlier_sigma * sd {
                db.mark_fact_outlier(*fact_id, true)?;
                report.outliers += 1;
            }
        }
    }
    log::info!(
        "stats for {} songs, {} outlier facts flagged",
        report.songs,
        report.outliers
    );
    Ok(report)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 for fewer than two values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::db::models::{Coverage, NewRecording, SourceType};

    // Facts reference recordings, so tests need stub rows with ids 1..=n.
    fn stub_recordings(db: &Database, n: i64) {
        for i in 0..n {
            db.insert_recording(&NewRecording {
                source_type: SourceType::ArchivalAudioSource,
                source_id: format!("rec-{i}"),
                title: None,
                show_date: None,
                venue: None,
                region: None,
                trust_rank: 100,
                coverage: Coverage::Complete,
            })
            .unwrap();
        }
    }

    #[test]
    fn mean_and_median() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn sample_std_dev() {
        assert_eq!(std_dev(&[10.0]), 0.0);
        // var = ((−1)² + 1²) / 1 = 2
        let sd = std_dev(&[9.0, 11.0]);
        assert!((sd - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn flags_extreme_fact_but_keeps_it() {
        let db = Database::open_in_memory().unwrap();
        let song = db.get_or_create_song("Dark Star", "song").unwrap();
        stub_recordings(&db, 4);
        let dates = ["1972-08-27", "1973-02-09", "1973-11-11", "1974-06-18"];
        for (i, date) in dates.iter().enumerate() {
            // Three ~20m performances and one 2m fragment
            let d = if i == 3 { 120.0 } else { 1200.0 + i as f64 };
            db.insert_fact(song, date, i as i64 + 1, d, 1, true).unwrap();
        }
        // With four samples, one far point sits at exactly 1.5 sample
        // standard deviations, so the test threshold must be below that.
        let t = Thresholds {
            outlier_sigma: 1.2,
            min_samples: 3,
            ..Thresholds::default()
        };
        let report = analyze(&db, &t).unwrap();
        assert_eq!(report.songs, 1);
        assert_eq!(report.outliers, 1);
        // Flagged, not removed: still four facts in the export
        let facts = db.export_facts().unwrap();
        assert_eq!(facts.len(), 4);
        assert_eq!(facts.iter().filter(|f| f.is_outlier).count(), 1);
        assert!(facts.iter().find(|f| f.is_outlier).unwrap().duration_seconds < 1000.0);
    }

    #[test]
    fn small_samples_never_flagged() {
        let db = Database::open_in_memory().unwrap();
        let song = db.get_or_create_song("Dark Star", "song").unwrap();
        stub_recordings(&db, 2);
        db.insert_fact(song, "1972-08-27", 1, 1200.0, 1, true).unwrap();
        db.insert_fact(song, "1973-02-09", 2, 60.0, 1, true).unwrap();
        let report = analyze(&db, &Thresholds::default()).unwrap();
        assert_eq!(report.outliers, 0);
    }

    #[test]
    fn stats_written_back_to_song() {
        let db = Database::open_in_memory().unwrap();
        let song = db.get_or_create_song("Eyes of the World", "song").unwrap();
        stub_recordings(&db, 2);
        db.insert_fact(song, "1973-11-11", 1, 600.0, 1, true).unwrap();
        db.insert_fact(song, "1974-06-18", 2, 720.0, 1, true).unwrap();
        analyze(&db, &Thresholds::default()).unwrap();
        let (times, mean_d, first): (i64, f64, String) = db
            .conn
            .query_row(
                "SELECT times_played, mean_duration, first_played FROM songs WHERE id = ?1",
                [song],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(times, 2);
        assert_eq!(mean_d, 660.0);
        assert_eq!(first, "1973-11-11");
    }

    #[test]
    fn ineligible_facts_invisible_to_stats() {
        let db = Database::open_in_memory().unwrap();
        let song = db.get_or_create_song("Dark Star", "song").unwrap();
        stub_recordings(&db, 1);
        db.insert_fact(song, "1972-08-27", 1, 1200.0, 1, false).unwrap();
        let report = analyze(&db, &Thresholds::default()).unwrap();
        assert_eq!(report.songs, 0);
    }
}
