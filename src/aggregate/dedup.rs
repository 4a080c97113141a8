//! Release deduplication: one recording per show.
//!
//! A show usually circulates as several tapes of varying fidelity and
//! completeness. Averaging across them would weight every statistic by
//! how many tapes happen to exist, so instead exactly one recording is
//! selected per show and only its tracks feed aggregation.

use std::collections::HashMap;

use crate::db::models::Recording;

/// Pick one recording per show. Ranking: trust_rank descending, then
/// total song duration descending (missing segments lower the total, so
/// the longer tape is the more complete one), then lowest id so equal
/// recordings select identically across runs.
///
/// `totals` maps recording id to the summed duration of its song tracks.
/// Recordings without a show date cannot be keyed to a show and are
/// skipped. Returns selected recording ids.
pub fn select_recordings(recordings: &[Recording], totals: &HashMap<i64, f64>) -> Vec<i64> {
    let mut best: HashMap<(String, String), &Recording> = HashMap::new();
    for rec in recordings {
        let Some(date) = &rec.show_date else {
            log::debug!("recording {} has no show date, skipping", rec.source_id);
            continue;
        };
        let venue = rec
            .venue
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let key = (date.clone(), venue);
        match best.get(&key) {
            Some(cur) if !beats(rec, cur, totals) => {}
            _ => {
                best.insert(key, rec);
            }
        }
    }
    let mut ids: Vec<i64> = best.values().map(|r| r.id).collect();
    ids.sort_unstable();
    ids
}

fn beats(a: &Recording, b: &Recording, totals: &HashMap<i64, f64>) -> bool {
    if a.trust_rank != b.trust_rank {
        return a.trust_rank > b.trust_rank;
    }
    let ta = totals.get(&a.id).copied().unwrap_or(0.0);
    let tb = totals.get(&b.id).copied().unwrap_or(0.0);
    if ta != tb {
        return ta > tb;
    }
    a.id < b.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Coverage;

    fn rec(id: i64, date: &str, venue: &str, trust_rank: i64) -> Recording {
        Recording {
            id,
            source_type: "archival_audio_source".to_string(),
            source_id: format!("src-{id}"),
            show_date: Some(date.to_string()),
            venue: Some(venue.to_string()),
            trust_rank,
            coverage: Coverage::Unknown,
        }
    }

    #[test]
    fn highest_trust_rank_wins() {
        let recs = vec![
            rec(1, "1977-05-08", "Barton Hall", 100),
            rec(2, "1977-05-08", "Barton Hall", 500),
            rec(3, "1977-05-08", "Barton Hall", 300),
        ];
        assert_eq!(select_recordings(&recs, &HashMap::new()), vec![2]);
    }

    #[test]
    fn eight_tapers_one_survivor() {
        let ranks = [500, 300, 300, 100, 100, 100, 100, 100];
        let recs: Vec<Recording> = ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| rec(i as i64 + 1, "1972-08-27", "Old Renaissance Faire Grounds", r))
            .collect();
        assert_eq!(select_recordings(&recs, &HashMap::new()), vec![1]);
    }

    #[test]
    fn tie_broken_by_total_duration() {
        let recs = vec![
            rec(1, "1973-02-09", "Roscoe Maples Pavilion", 100),
            rec(2, "1973-02-09", "Roscoe Maples Pavilion", 100),
        ];
        let mut totals = HashMap::new();
        totals.insert(1, 9000.0);
        totals.insert(2, 10200.0);
        assert_eq!(select_recordings(&recs, &totals), vec![2]);
    }

    #[test]
    fn full_tie_broken_by_lowest_id() {
        let recs = vec![
            rec(7, "1974-06-18", "Freedom Hall", 100),
            rec(3, "1974-06-18", "Freedom Hall", 100),
        ];
        assert_eq!(select_recordings(&recs, &HashMap::new()), vec![3]);
    }

    #[test]
    fn shows_keyed_by_date_and_venue() {
        // Same date, different venues: two shows, two selections
        let recs = vec![
            rec(1, "1970-02-13", "Fillmore East (Early)", 100),
            rec(2, "1970-02-13", "Fillmore West", 100),
        ];
        assert_eq!(select_recordings(&recs, &HashMap::new()), vec![1, 2]);
    }

    #[test]
    fn venue_comparison_ignores_case_and_padding() {
        let recs = vec![
            rec(1, "1977-05-08", "Barton Hall", 100),
            rec(2, "1977-05-08", "  barton hall ", 300),
        ];
        assert_eq!(select_recordings(&recs, &HashMap::new()), vec![2]);
    }

    #[test]
    fn undated_recordings_skipped() {
        let mut undated = rec(1, "x", "Winterland", 500);
        undated.show_date = None;
        let recs = vec![undated, rec(2, "1974-10-18", "Winterland", 100)];
        assert_eq!(select_recordings(&recs, &HashMap::new()), vec![2]);
    }
}
