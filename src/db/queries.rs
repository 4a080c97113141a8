use super::models::{
    Coverage, DbStats, NewRecording, NewTrack, PerformanceFact, Recording, ReviewEntry, Song,
    SongStats, Track,
};
use super::{Database, Result};
use rusqlite::{OptionalExtension, params};

impl Database {
    // ── Ingest ─────────────────────────────────────────────────────────

    /// Insert a recording. Returns the recording id, or None if a recording
    /// with the same source_id already exists (scrapes are append-only).
    pub fn insert_recording(&self, r: &NewRecording) -> Result<Option<i64>> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO recordings
                (source_type, source_id, title, show_date, venue, region, trust_rank, coverage)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                r.source_type.as_str(),
                r.source_id,
                r.title,
                r.show_date,
                r.venue,
                r.region,
                r.trust_rank,
                r.coverage.as_str(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let id = self.conn.query_row(
            "SELECT id FROM recordings WHERE source_id = ?1",
            params![r.source_id],
            |row| row.get(0),
        )?;
        Ok(Some(id))
    }

    pub fn insert_track(&self, t: &NewTrack) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO tracks (recording_id, position, raw_title, duration_seconds, segue_flag)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                t.recording_id,
                t.position,
                t.raw_title,
                t.duration_seconds,
                t.segue_flag as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Correct a recording's coverage, keyed on source-specific release
    /// identity. Returns false if no such recording exists.
    pub fn set_coverage(&self, source_id: &str, coverage: Coverage) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE recordings SET coverage = ?1 WHERE source_id = ?2",
            params![coverage.as_str(), source_id],
        )?;
        Ok(changed > 0)
    }

    // ── Pipeline run lifecycle ─────────────────────────────────────────

    /// Clear all derived state so a run starts from scratch. Songs and
    /// persisted aliases survive; facts and the review queue are rebuilt.
    pub fn reset_derived(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            UPDATE tracks SET song_id = NULL, is_non_song = 0,
                              sandwich_duration = NULL;
            DELETE FROM performance_facts;
            DELETE FROM review_queue;
            UPDATE songs SET times_played = NULL, mean_duration = NULL,
                             median_duration = NULL, std_duration = NULL,
                             first_played = NULL, last_played = NULL;
            ",
        )?;
        Ok(())
    }

    // ── Songs and aliases ──────────────────────────────────────────────

    pub fn get_or_create_song(&self, canonical_name: &str, song_type: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO songs (canonical_name, song_type) VALUES (?1, ?2)",
            params![canonical_name, song_type],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM songs WHERE canonical_name = ?1",
            params![canonical_name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Record an alias. An existing alias always wins (manual corrections
    /// are never overwritten by pipeline-written variants).
    pub fn add_alias(&self, alias: &str, song_id: i64, alias_type: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO song_aliases (alias, song_id, alias_type)
             VALUES (?1, ?2, ?3)",
            params![alias, song_id, alias_type],
        )?;
        Ok(())
    }

    /// All songs in insertion order (id ascending). Order matters: the
    /// resolver's fuzzy tie-break is candidate insertion order.
    pub fn all_songs(&self) -> Result<Vec<Song>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, canonical_name, song_type FROM songs ORDER BY id")?;
        let songs = stmt
            .query_map([], |row| {
                Ok(Song {
                    id: row.get(0)?,
                    canonical_name: row.get(1)?,
                    song_type: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    /// All persisted aliases in insertion order: (alias, song_id, alias_type).
    pub fn all_aliases(&self) -> Result<Vec<(String, i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT alias, song_id, alias_type FROM song_aliases ORDER BY id")?;
        let aliases = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(aliases)
    }

    /// Songs below the track-count floor: (id, canonical_name, track_count).
    pub fn rare_songs(&self, min_tracks: i64) -> Result<Vec<(i64, String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.canonical_name, COUNT(t.id) AS cnt
             FROM songs s
             LEFT JOIN tracks t ON t.song_id = s.id
             GROUP BY s.id
             HAVING cnt < ?1
             ORDER BY s.id",
        )?;
        let rows = stmt
            .query_map(params![min_tracks], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete a pruned song: null out its tracks, drop aliases, drop the row.
    pub fn prune_song(&self, song_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE tracks SET song_id = NULL WHERE song_id = ?1",
            params![song_id],
        )?;
        self.conn.execute(
            "DELETE FROM song_aliases WHERE song_id = ?1",
            params![song_id],
        )?;
        self.conn
            .execute("DELETE FROM songs WHERE id = ?1", params![song_id])?;
        Ok(())
    }

    // ── Tracks ─────────────────────────────────────────────────────────

    /// All recordings, insertion order.
    pub fn all_recordings(&self) -> Result<Vec<Recording>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_type, source_id, show_date, venue, trust_rank, coverage
             FROM recordings ORDER BY id",
        )?;
        let recs = stmt
            .query_map([], |row| {
                Ok(Recording {
                    id: row.get(0)?,
                    source_type: row.get(1)?,
                    source_id: row.get(2)?,
                    show_date: row.get(3)?,
                    venue: row.get(4)?,
                    trust_rank: row.get(5)?,
                    coverage: Coverage::parse(&row.get::<_, String>(6)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(recs)
    }

    /// One recording's tracks in tracklist order.
    pub fn tracks_for_recording(&self, recording_id: i64) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recording_id, position, raw_title, duration_seconds,
                    segue_flag, song_id, is_non_song, sandwich_duration
             FROM tracks WHERE recording_id = ?1 ORDER BY position",
        )?;
        let tracks = stmt
            .query_map(params![recording_id], |row| {
                Ok(Track {
                    id: row.get(0)?,
                    recording_id: row.get(1)?,
                    position: row.get(2)?,
                    raw_title: row.get(3)?,
                    duration_seconds: row.get(4)?,
                    segue_flag: row.get::<_, i64>(5)? != 0,
                    song_id: row.get(6)?,
                    is_non_song: row.get::<_, i64>(7)? != 0,
                    sandwich_duration: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    /// All track ids and raw titles in deterministic order for resolution.
    pub fn all_tracks_for_resolution(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, raw_title FROM tracks ORDER BY recording_id, position",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn assign_track_song(&self, track_id: i64, song_id: Option<i64>) -> Result<()> {
        self.conn.execute(
            "UPDATE tracks SET song_id = ?1 WHERE id = ?2",
            params![song_id, track_id],
        )?;
        Ok(())
    }

    pub fn mark_non_song(&self, track_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE tracks SET is_non_song = 1, song_id = NULL WHERE id = ?1",
            params![track_id],
        )?;
        Ok(())
    }

    pub fn set_sandwich_duration(&self, track_id: i64, duration: f64) -> Result<()> {
        self.conn.execute(
            "UPDATE tracks SET sandwich_duration = ?1 WHERE id = ?2",
            params![duration, track_id],
        )?;
        Ok(())
    }

    /// Distinct raw titles that resolved to nothing (for review tooling).
    pub fn unmatched_titles(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT raw_title FROM tracks
             WHERE song_id IS NULL AND is_non_song = 0
             ORDER BY raw_title",
        )?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Performance facts ──────────────────────────────────────────────

    pub fn insert_fact(
        &self,
        song_id: i64,
        show_date: &str,
        recording_id: i64,
        duration_seconds: f64,
        segment_count: i64,
        eligible: bool,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO performance_facts
                (song_id, show_date, recording_id, duration_seconds, segment_count, eligible)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                song_id,
                show_date,
                recording_id,
                duration_seconds,
                segment_count,
                eligible as i64,
            ],
        )?;
        Ok(())
    }

    /// Song ids that have at least one statistics-eligible fact.
    pub fn songs_with_eligible_facts(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT song_id FROM performance_facts
             WHERE eligible = 1 ORDER BY song_id",
        )?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Eligible facts for one song: (fact_id, show_date, duration_seconds).
    pub fn eligible_facts_for_song(&self, song_id: i64) -> Result<Vec<(i64, String, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, show_date, duration_seconds FROM performance_facts
             WHERE song_id = ?1 AND eligible = 1
             ORDER BY show_date, id",
        )?;
        let rows = stmt
            .query_map(params![song_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn mark_fact_outlier(&self, fact_id: i64, is_outlier: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE performance_facts SET is_outlier = ?1 WHERE id = ?2",
            params![is_outlier as i64, fact_id],
        )?;
        Ok(())
    }

    pub fn update_song_stats(&self, song_id: i64, stats: &SongStats) -> Result<()> {
        self.conn.execute(
            "UPDATE songs SET times_played = ?1, mean_duration = ?2, median_duration = ?3,
                              std_duration = ?4, first_played = ?5, last_played = ?6
             WHERE id = ?7",
            params![
                stats.times_played,
                stats.mean_duration,
                stats.median_duration,
                stats.std_duration,
                stats.first_played,
                stats.last_played,
                song_id,
            ],
        )?;
        Ok(())
    }

    /// All facts joined with song names, for export and the default views.
    /// Outlier facts are included — the flag is advisory only.
    pub fn export_facts(&self) -> Result<Vec<PerformanceFact>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.song_id, s.canonical_name, f.show_date, f.recording_id,
                    f.duration_seconds, f.segment_count, f.is_outlier, f.eligible
             FROM performance_facts f
             JOIN songs s ON s.id = f.song_id
             ORDER BY s.canonical_name, f.show_date, f.recording_id",
        )?;
        let facts = stmt
            .query_map([], |row| {
                Ok(PerformanceFact {
                    song_id: row.get(0)?,
                    song: row.get(1)?,
                    show_date: row.get(2)?,
                    recording_id: row.get(3)?,
                    duration_seconds: row.get(4)?,
                    segment_count: row.get(5)?,
                    is_outlier: row.get::<_, i64>(6)? != 0,
                    eligible: row.get::<_, i64>(7)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(facts)
    }

    // ── Review queue ───────────────────────────────────────────────────

    pub fn push_review(
        &self,
        raw_title: &str,
        cleaned: &str,
        song_id: Option<i64>,
        similarity: Option<f64>,
        reason: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO review_queue (raw_title, cleaned, song_id, similarity, reason)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![raw_title, cleaned, song_id, similarity, reason],
        )?;
        Ok(())
    }

    pub fn review_entries(&self) -> Result<Vec<ReviewEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, raw_title, cleaned, song_id, similarity, reason
             FROM review_queue ORDER BY id",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(ReviewEntry {
                    id: row.get(0)?,
                    raw_title: row.get(1)?,
                    cleaned: row.get(2)?,
                    song_id: row.get(3)?,
                    similarity: row.get(4)?,
                    reason: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Confirm a queued entry: persist its cleaned title as a manual alias
    /// for the given song and drop the entry. Takes effect on the next
    /// full pipeline run.
    pub fn confirm_review(&self, review_id: i64, song_id: i64) -> Result<bool> {
        let entry: Option<String> = self
            .conn
            .query_row(
                "SELECT cleaned FROM review_queue WHERE id = ?1",
                params![review_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(cleaned) = entry else {
            return Ok(false);
        };
        // Manual aliases are authoritative: replace any pipeline-written one.
        self.conn.execute(
            "DELETE FROM song_aliases WHERE alias = ?1",
            params![cleaned.to_lowercase()],
        )?;
        self.conn.execute(
            "INSERT INTO song_aliases (alias, song_id, alias_type) VALUES (?1, ?2, 'manual')",
            params![cleaned.to_lowercase(), song_id],
        )?;
        self.conn
            .execute("DELETE FROM review_queue WHERE id = ?1", params![review_id])?;
        Ok(true)
    }

    // ── Status ─────────────────────────────────────────────────────────

    pub fn db_stats(&self) -> Result<DbStats> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };
        let by = |sql: &str| -> Result<Vec<(String, i64)>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        };
        Ok(DbStats {
            songs: count("SELECT COUNT(*) FROM songs")?,
            aliases: count("SELECT COUNT(*) FROM song_aliases")?,
            recordings: count("SELECT COUNT(*) FROM recordings")?,
            tracks: count("SELECT COUNT(*) FROM tracks")?,
            tracks_with_duration: count(
                "SELECT COUNT(*) FROM tracks WHERE duration_seconds IS NOT NULL",
            )?,
            unmatched_tracks: count(
                "SELECT COUNT(*) FROM tracks WHERE song_id IS NULL AND is_non_song = 0",
            )?,
            facts: count("SELECT COUNT(*) FROM performance_facts")?,
            review_pending: count("SELECT COUNT(*) FROM review_queue")?,
            by_source: by(
                "SELECT source_type, COUNT(*) FROM recordings GROUP BY source_type ORDER BY 2 DESC",
            )?,
            by_coverage: by(
                "SELECT coverage, COUNT(*) FROM recordings GROUP BY coverage ORDER BY 2 DESC",
            )?,
        })
    }
}
