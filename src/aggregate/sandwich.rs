//! Split-performance ("sandwich") detection.
//!
//! One musical performance is often tracked as several pieces wrapped
//! around an interlude block: `Playing in the Band / Drums / Space /
//! Playing in the Band`. Those pieces are one performance, and summing
//! them is the only way its duration comes out right.
//!
//! Detection runs per recording over the ordered tracklist. A sandwich
//! is the same canonical song on both sides of a gap consisting only of
//! interlude-type tracks. Any ordinary song in the gap breaks the
//! pattern: that is two independent performances. A reprise never gets
//! here as "the same song" because it carries its own identity.
//!
//! The combined duration (sum of the song's own segments, not the
//! interludes) is attached to the first segment; every later segment is
//! zeroed so a MAX over the recording cannot double count.

use std::collections::HashSet;

use crate::db::models::Track;

/// One detected sandwich group within a recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Sandwich {
    /// Track id of the first segment, which carries the combined duration.
    pub first_track: i64,
    /// Sum of the song's own segment durations.
    pub combined: f64,
    /// Later segments, to be zeroed.
    pub zeroed: Vec<i64>,
}

/// Scan one recording's ordered tracks for sandwich groups.
///
/// `interludes` is the set of song ids typed as interludes. Tracks with
/// no resolved song (non-songs, dropped titles) break a gap just like an
/// ordinary song would.
pub fn detect(tracks: &[Track], interludes: &HashSet<i64>) -> Vec<Sandwich> {
    let mut found = Vec::new();
    let mut claimed: HashSet<usize> = HashSet::new();

    for start in 0..tracks.len() {
        if claimed.contains(&start) {
            continue;
        }
        let Some(song) = tracks[start].song_id else {
            continue;
        };
        if interludes.contains(&song) {
            continue;
        }

        // Follow interlude-only gaps back to the same song, chaining
        // repeated blocks into one group.
        let mut chain = vec![start];
        let mut cur = start;
        loop {
            let mut j = cur + 1;
            let mut gap = 0;
            while j < tracks.len()
                && tracks[j].song_id.is_some_and(|id| interludes.contains(&id))
            {
                gap += 1;
                j += 1;
            }
            if j >= tracks.len() || tracks[j].song_id != Some(song) {
                break;
            }
            if gap == 0 {
                // Same song back to back: a duplicate-track artifact or
                // data error, never summed.
                log::warn!(
                    "recording {}: consecutive duplicate at positions {} and {}, not aggregating",
                    tracks[j].recording_id,
                    tracks[cur].position,
                    tracks[j].position
                );
                break;
            }
            chain.push(j);
            cur = j;
        }

        if chain.len() < 2 {
            continue;
        }
        claimed.extend(chain.iter().copied());

        let combined: f64 = chain
            .iter()
            .filter_map(|&i| tracks[i].duration_seconds)
            .sum();
        if chain.iter().all(|&i| tracks[i].duration_seconds.is_none()) {
            // Nothing to sum; the segments contribute no fact anyway
            continue;
        }
        found.push(Sandwich {
            first_track: tracks[chain[0]].id,
            combined,
            zeroed: chain[1..].iter().map(|&i| tracks[i].id).collect(),
        });
    }
    found
}
