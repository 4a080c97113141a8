//! Canonical song resolution.
//!
//! Maps a cleaned, segment-stripped title to a stable song identity via an
//! ordered chain of lookups — first match wins:
//!
//! 1. Persisted alias table (operator-confirmed corrections; authoritative)
//! 2. Static built-in dictionary
//! 3. Case-insensitive exact match against known canonical names
//! 4. Fuzzy similarity against all known canonical names and aliases
//! 5. New song identity (logged for review)
//!
//! The resolver owns an in-memory index rebuilt from persisted song/alias
//! data at run start and flushed back only for newly created entries.
//! Lookups and creations are serialized per run: resolution order affects
//! which song a new alias binds to, so it must be deterministic across
//! runs given the same input order.

use std::collections::HashMap;

use crate::catalog;
use crate::config::Thresholds;
use crate::db::{Database, Result};

/// How a title was bound to its song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Exact hit in the persisted alias table.
    Alias,
    /// Exact hit in the built-in dictionary or on a canonical name.
    Exact,
    /// Fuzzy similarity at or above the auto threshold.
    FuzzyAuto,
    /// Fuzzy similarity in the review band; bound provisionally.
    FuzzyFlagged,
    /// No match anywhere; a new song identity was created.
    New,
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub song_id: i64,
    pub canonical_name: String,
    pub kind: MatchKind,
}

/// Counters for one resolution pass.
#[derive(Debug, Default)]
pub struct ResolveStats {
    pub alias_hits: u64,
    pub exact_hits: u64,
    pub fuzzy_auto: u64,
    pub fuzzy_flagged: u64,
    pub new_songs: u64,
}

/// What a fuzzy-match candidate binds to. Built-in dictionary entries are
/// candidates before any song row exists for them; their row is created
/// only when a title actually matches.
#[derive(Clone, Copy)]
enum Target {
    Song(i64),
    Builtin(&'static str),
}

/// One fuzzy-match candidate. Kept in insertion order: equal-score ties
/// resolve to the earliest-inserted candidate, which keeps runs
/// reproducible.
struct Candidate {
    lower: String,
    target: Target,
}

pub struct SongResolver<'a> {
    db: &'a Database,
    thresholds: &'a Thresholds,
    /// Persisted alias (lowercase) → song id. Includes manual corrections.
    alias_index: HashMap<String, i64>,
    /// Lowercase canonical name → song id.
    canon_index: HashMap<String, i64>,
    /// Canonical names then aliases, insertion order, for fuzzy matching.
    candidates: Vec<Candidate>,
    /// Song id → canonical display name.
    names: HashMap<i64, String>,
    pub stats: ResolveStats,
}

impl<'a> SongResolver<'a> {
    /// Build the in-memory index from persisted song/alias data.
    pub fn new(db: &'a Database, thresholds: &'a Thresholds) -> Result<Self> {
        let mut alias_index = HashMap::new();
        let mut canon_index = HashMap::new();
        let mut candidates = Vec::new();
        let mut names = HashMap::new();

        // Dictionary entries first (each canonical name followed by its
        // builtin alias strings), then persisted songs, then persisted
        // aliases. The order is fixed so equal-score fuzzy ties resolve
        // identically across runs.
        for (canonical, aliases) in catalog::CANONICAL_SONGS {
            candidates.push(Candidate {
                lower: canonical.to_lowercase(),
                target: Target::Builtin(canonical),
            });
            for alias in *aliases {
                candidates.push(Candidate {
                    lower: alias.to_lowercase(),
                    target: Target::Builtin(canonical),
                });
            }
        }
        for song in db.all_songs()? {
            let lower = song.canonical_name.to_lowercase();
            canon_index.insert(lower.clone(), song.id);
            candidates.push(Candidate {
                lower,
                target: Target::Song(song.id),
            });
            names.insert(song.id, song.canonical_name);
        }
        for (alias, song_id, _alias_type) in db.all_aliases()? {
            alias_index.insert(alias.clone(), song_id);
            candidates.push(Candidate {
                lower: alias,
                target: Target::Song(song_id),
            });
        }

        Ok(Self {
            db,
            thresholds,
            alias_index,
            canon_index,
            candidates,
            names,
            stats: ResolveStats::default(),
        })
    }

    /// Resolve one segment-stripped title to a song identity.
    ///
    /// `raw_title` is carried along only for review-queue context.
    pub fn resolve(&mut self, raw_title: &str, resolve_key: &str) -> Result<Option<Resolution>> {
        // Purely punctuation or too short to be a song name
        if resolve_key.len() < 2 || !resolve_key.chars().any(|c| c.is_alphabetic()) {
            return Ok(None);
        }
        let lower = resolve_key.to_lowercase();

        // 1. Persisted alias table (includes manual corrections)
        if let Some(&song_id) = self.alias_index.get(&lower) {
            self.stats.alias_hits += 1;
            return Ok(Some(self.resolution(song_id, MatchKind::Alias)));
        }

        // 2. Static built-in dictionary
        if let Some(canonical) = catalog::lookup(&lower) {
            let song_id = self.ensure_song(canonical)?;
            self.record_alias(&lower, song_id, "variant")?;
            self.stats.exact_hits += 1;
            return Ok(Some(self.resolution(song_id, MatchKind::Exact)));
        }

        // 3. Case-insensitive exact match on a known canonical name
        if let Some(&song_id) = self.canon_index.get(&lower) {
            self.record_alias(&lower, song_id, "variant")?;
            self.stats.exact_hits += 1;
            return Ok(Some(self.resolution(song_id, MatchKind::Exact)));
        }

        // 4. Fuzzy similarity against all known canonical names/aliases.
        // Strictly-greater comparison: equal scores keep the earliest
        // candidate, so the tie-break is insertion order.
        let mut best: Option<(f64, usize)> = None;
        for (idx, cand) in self.candidates.iter().enumerate() {
            let sim = strsim::normalized_levenshtein(&lower, &cand.lower);
            if best.is_none_or(|(b, _)| sim > b) {
                best = Some((sim, idx));
            }
        }
        // Materialize the candidate's song row only once a threshold is
        // met: a below-band best match is no match at all, and must not
        // leave a phantom row for an unrelated dictionary entry behind.
        if let Some((sim, idx)) = best {
            let target = self.candidates[idx].target;
            if sim >= self.thresholds.fuzzy_auto {
                let song_id = self.materialize(target)?;
                self.record_alias(&lower, song_id, "auto_fuzzy")?;
                self.stats.fuzzy_auto += 1;
                return Ok(Some(self.resolution(song_id, MatchKind::FuzzyAuto)));
            }
            if sim >= self.thresholds.fuzzy_flag {
                // Accept provisionally, but queue for human confirmation
                let song_id = self.materialize(target)?;
                self.record_alias(&lower, song_id, "fuzzy_flagged")?;
                self.db
                    .push_review(raw_title, resolve_key, Some(song_id), Some(sim), "fuzzy_flagged")?;
                self.stats.fuzzy_flagged += 1;
                return Ok(Some(self.resolution(song_id, MatchKind::FuzzyFlagged)));
            }
        }

        // 5. No match — create a new identity and log it for review
        let song_id = self.ensure_song(resolve_key)?;
        self.record_alias(&lower, song_id, "variant")?;
        self.db
            .push_review(raw_title, resolve_key, Some(song_id), None, "new_song")?;
        self.stats.new_songs += 1;
        log::debug!("new song identity: {resolve_key:?}");
        Ok(Some(self.resolution(song_id, MatchKind::New)))
    }

    fn resolution(&self, song_id: i64, kind: MatchKind) -> Resolution {
        Resolution {
            song_id,
            canonical_name: self
                .names
                .get(&song_id)
                .cloned()
                .unwrap_or_default(),
            kind,
        }
    }

    /// Resolve a fuzzy target to its song row, creating the row for a
    /// dictionary entry matched for the first time.
    fn materialize(&mut self, target: Target) -> Result<i64> {
        match target {
            Target::Song(id) => Ok(id),
            Target::Builtin(canonical) => self.ensure_song(canonical),
        }
    }

    /// Get or create a song row and keep the in-memory index in sync.
    fn ensure_song(&mut self, canonical: &str) -> Result<i64> {
        let lower = canonical.to_lowercase();
        if let Some(&id) = self.canon_index.get(&lower) {
            return Ok(id);
        }
        let song_type = if catalog::is_interlude(canonical) {
            "interlude"
        } else {
            "song"
        };
        let id = self.db.get_or_create_song(canonical, song_type)?;
        self.canon_index.insert(lower.clone(), id);
        self.candidates.push(Candidate {
            lower,
            target: Target::Song(id),
        });
        self.names.insert(id, canonical.to_string());
        Ok(id)
    }

    /// Persist an alias and mirror it into the in-memory index. An existing
    /// persisted alias (e.g. a manual correction) always wins.
    fn record_alias(&mut self, lower: &str, song_id: i64, alias_type: &str) -> Result<()> {
        if self.alias_index.contains_key(lower) {
            return Ok(());
        }
        self.db.add_alias(lower, song_id, alias_type)?;
        self.alias_index.insert(lower.to_string(), song_id);
        self.candidates.push(Candidate {
            lower: lower.to_string(),
            target: Target::Song(song_id),
        });
        Ok(())
    }
}

/// Counters for one full track-resolution pass.
#[derive(Debug, Default)]
pub struct ResolvePassReport {
    pub tracks: usize,
    pub resolved: usize,
    pub non_songs: usize,
    pub dropped: usize,
}

/// Resolve every track in the database, in deterministic order.
///
/// Normalization runs per track; anything that survives it goes through
/// the resolver. Dropped and non-song tracks keep a null song id.
pub fn resolve_tracks(
    db: &Database,
    thresholds: &Thresholds,
) -> Result<(ResolvePassReport, ResolveStats)> {
    use crate::normalize::{self, NormalizedTitle};
    use indicatif::{ProgressBar, ProgressStyle};

    let mut resolver = SongResolver::new(db, thresholds)?;
    let mut report = ResolvePassReport::default();

    let tracks = db.all_tracks_for_resolution()?;
    let pb = ProgressBar::new(tracks.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} resolving")
            .unwrap()
            .progress_chars("#>-"),
    );
    for (track_id, raw_title) in tracks {
        report.tracks += 1;
        match normalize::normalize_title(&raw_title) {
            NormalizedTitle::Dropped => report.dropped += 1,
            NormalizedTitle::NonSong => {
                db.mark_non_song(track_id)?;
                report.non_songs += 1;
            }
            NormalizedTitle::Song { resolve_key, .. } => {
                match resolver.resolve(&raw_title, &resolve_key)? {
                    Some(resolution) => {
                        db.assign_track_song(track_id, Some(resolution.song_id))?;
                        report.resolved += 1;
                    }
                    None => report.dropped += 1,
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    log::info!(
        "{} tracks: {} resolved, {} non-songs, {} dropped",
        report.tracks,
        report.resolved,
        report.non_songs,
        report.dropped
    );
    Ok((report, resolver.stats))
}

/// Post-pass: drop songs with fewer than `min_tracks` tracks that are not
/// in the built-in dictionary. Real songs appear in many recordings; very
/// rare ones are almost always one-off typos that slipped past fuzzy
/// matching, tape notes, or venue descriptions.
///
/// Returns the number of songs pruned.
pub fn prune_rare_songs(db: &Database, min_tracks: i64) -> Result<usize> {
    let mut pruned = 0;
    for (song_id, canonical_name, count) in db.rare_songs(min_tracks)? {
        if catalog::is_known_song(&canonical_name) {
            continue;
        }
        log::debug!("pruning rare song {canonical_name:?} ({count} tracks)");
        db.prune_song(song_id)?;
        pruned += 1;
    }
    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::db::Database;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn builtin_dictionary_hit() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        let r = resolver.resolve("China Cat", "China Cat").unwrap().unwrap();
        assert_eq!(r.kind, MatchKind::Exact);
        assert_eq!(r.canonical_name, "China Cat Sunflower");
    }

    #[test]
    fn persisted_alias_beats_everything() {
        let db = db();
        let t = thresholds();
        // Operator decided "dark starr" maps to a specific song
        let other = db.get_or_create_song("Some Other Song", "song").unwrap();
        db.add_alias("dark starr", other, "manual").unwrap();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        let r = resolver.resolve("Dark Starr", "Dark Starr").unwrap().unwrap();
        assert_eq!(r.kind, MatchKind::Alias);
        assert_eq!(r.song_id, other);
    }

    #[test]
    fn case_insensitive_canonical_match() {
        let db = db();
        let t = thresholds();
        let id = db.get_or_create_song("Whipping Post", "song").unwrap();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        let r = resolver
            .resolve("WHIPPING POST", "WHIPPING POST")
            .unwrap()
            .unwrap();
        assert_eq!(r.song_id, id);
        assert_eq!(r.kind, MatchKind::Exact);
    }

    #[test]
    fn fuzzy_auto_binds_close_typo() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        // One char off from "Scarlet Begonias" (16 chars): sim = 15/16 ≈ 0.94
        let r = resolver
            .resolve("Scarlet Begonies", "Scarlet Begonies")
            .unwrap()
            .unwrap();
        assert_eq!(r.kind, MatchKind::FuzzyAuto);
        assert_eq!(r.canonical_name, "Scarlet Begonias");
        assert!(db.review_entries().unwrap().is_empty());
    }

    #[test]
    fn fuzzy_band_is_queued_not_trusted() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        // "Casey Jonesey" vs "Casey Jones": distance 2 over 13 → ≈ 0.846,
        // inside the review band
        let r = resolver
            .resolve("Casey Jonesey", "Casey Jonesey")
            .unwrap()
            .unwrap();
        assert_eq!(r.kind, MatchKind::FuzzyFlagged);
        assert_eq!(r.canonical_name, "Casey Jones");
        let queue = db.review_entries().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].reason, "fuzzy_flagged");
        assert!(queue[0].similarity.unwrap() < t.fuzzy_auto);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let t = thresholds();
        // Fresh resolver per case: each resolution records an alias that
        // would otherwise become a closer candidate for the next one.

        // 20 chars, distance 3 → exactly 0.85: auto-accepts
        let db1 = db();
        db1.get_or_create_song("aaaaaaaaaaaaaaaaaaab", "song").unwrap();
        let mut resolver = SongResolver::new(&db1, &t).unwrap();
        let r = resolver
            .resolve("x", "aaaaaaaaaaaaaaaaabcd")
            .unwrap()
            .unwrap();
        assert_eq!(r.kind, MatchKind::FuzzyAuto);

        // 20 chars, distance 4 → 0.80: review band
        let db2 = db();
        db2.get_or_create_song("aaaaaaaaaaaaaaaaaaab", "song").unwrap();
        let mut resolver = SongResolver::new(&db2, &t).unwrap();
        let r = resolver
            .resolve("x", "aaaaaaaaaaaaaaaabcde")
            .unwrap()
            .unwrap();
        assert_eq!(r.kind, MatchKind::FuzzyFlagged);
    }

    #[test]
    fn no_match_creates_new_identity_and_review_entry() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        let r = resolver
            .resolve("Zanzibar Freakout", "Zanzibar Freakout")
            .unwrap()
            .unwrap();
        assert_eq!(r.kind, MatchKind::New);
        assert_eq!(r.canonical_name, "Zanzibar Freakout");
        let queue = db.review_entries().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].reason, "new_song");
        // Second sighting resolves through the alias, not a second creation
        let r2 = resolver
            .resolve("Zanzibar Freakout", "Zanzibar Freakout")
            .unwrap()
            .unwrap();
        assert_eq!(r2.song_id, r.song_id);
        assert_eq!(r2.kind, MatchKind::Alias);
    }

    #[test]
    fn no_match_leaves_no_phantom_dictionary_rows() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        // Below the review band everywhere: only the new identity may be
        // created, never a row for the best-scoring dictionary entry
        resolver
            .resolve("Zanzibar Freakout", "Zanzibar Freakout")
            .unwrap()
            .unwrap();
        let names: Vec<String> = db
            .all_songs()
            .unwrap()
            .into_iter()
            .map(|s| s.canonical_name)
            .collect();
        assert_eq!(names, vec!["Zanzibar Freakout".to_string()]);
    }

    #[test]
    fn builtin_alias_strings_are_fuzzy_candidates() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        // One edit from the builtin alias "china cat" (sim 0.9), far from
        // the canonical "China Cat Sunflower" itself (sim ≈ 0.53)
        let r = resolver.resolve("China Catt", "China Catt").unwrap().unwrap();
        assert_eq!(r.kind, MatchKind::FuzzyAuto);
        assert_eq!(r.canonical_name, "China Cat Sunflower");
    }

    #[test]
    fn equal_score_tie_breaks_by_insertion_order() {
        let db = db();
        let t = thresholds();
        let first = db.get_or_create_song("abcx", "song").unwrap();
        let second = db.get_or_create_song("abcy", "song").unwrap();
        assert!(first < second);
        let mut r1 = SongResolver::new(&db, &t).unwrap();
        let got = r1.resolve("abcz", "abcz").unwrap().unwrap();
        // Both candidates score 0.75; the earlier-inserted song wins
        assert_eq!(got.song_id, first);
        // And again on a fresh resolver: reproducible
        drop(r1);
        let db2 = Database::open_in_memory().unwrap();
        let f2 = db2.get_or_create_song("abcx", "song").unwrap();
        db2.get_or_create_song("abcy", "song").unwrap();
        let mut r2 = SongResolver::new(&db2, &t).unwrap();
        assert_eq!(r2.resolve("abcz", "abcz").unwrap().unwrap().song_id, f2);
    }

    #[test]
    fn interlude_songs_get_interlude_type() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        resolver.resolve("Drums", "Drums").unwrap().unwrap();
        let songs = db.all_songs().unwrap();
        let drums = songs.iter().find(|s| s.canonical_name == "Drums").unwrap();
        assert_eq!(drums.song_type, "interlude");
    }

    #[test]
    fn prune_drops_rare_unknown_songs_only() {
        let db = db();
        let t = thresholds();
        let mut resolver = SongResolver::new(&db, &t).unwrap();
        // A typo-song with no tracks at all
        resolver.resolve("Zanzibar Freakout", "Zanzibar Freakout").unwrap();
        // A dictionary song, also without tracks
        resolver.resolve("Dark Star", "Dark Star").unwrap();
        let pruned = prune_rare_songs(&db, 3).unwrap();
        assert_eq!(pruned, 1);
        let names: Vec<String> = db
            .all_songs()
            .unwrap()
            .into_iter()
            .map(|s| s.canonical_name)
            .collect();
        assert!(names.contains(&"Dark Star".to_string()));
        assert!(!names.contains(&"Zanzibar Freakout".to_string()));
    }
}
