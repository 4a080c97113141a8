pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Database {
    pub conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        // WAL mode for better concurrent read performance
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        self.migrate()?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if version < 1 {
            self.migrate_v1()?;
        }

        self.conn.pragma_update(None, "user_version", 1)?;
        Ok(())
    }

    /// V1: songs, aliases, recordings, tracks, performance facts, review queue.
    fn migrate_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS songs (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                canonical_name  TEXT NOT NULL UNIQUE,
                song_type       TEXT NOT NULL DEFAULT 'song',

                -- Per-song summary stats, filled by the analyze pass
                times_played    INTEGER,
                mean_duration   REAL,
                median_duration REAL,
                std_duration    REAL,
                first_played    TEXT,
                last_played     TEXT,

                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS song_aliases (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                alias       TEXT NOT NULL UNIQUE,
                song_id     INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
                -- 'manual' aliases are operator-confirmed and authoritative;
                -- 'variant', 'auto_fuzzy', 'fuzzy_flagged' are pipeline-written.
                alias_type  TEXT NOT NULL DEFAULT 'variant',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_aliases_song ON song_aliases(song_id);

            CREATE TABLE IF NOT EXISTS recordings (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                source_type TEXT NOT NULL,
                source_id   TEXT NOT NULL UNIQUE,
                title       TEXT,
                show_date   TEXT,
                venue       TEXT,
                region      TEXT,
                trust_rank  INTEGER NOT NULL DEFAULT 100,
                coverage    TEXT NOT NULL DEFAULT 'unknown',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_recordings_date ON recordings(show_date);

            CREATE TABLE IF NOT EXISTS tracks (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                recording_id      INTEGER NOT NULL REFERENCES recordings(id) ON DELETE CASCADE,
                position          INTEGER NOT NULL,
                raw_title         TEXT NOT NULL,
                duration_seconds  REAL,
                segue_flag        INTEGER NOT NULL DEFAULT 0,

                -- Derived fields, written exclusively by the pipeline
                song_id           INTEGER REFERENCES songs(id) ON DELETE SET NULL,
                is_non_song       INTEGER NOT NULL DEFAULT 0,
                sandwich_duration REAL,

                UNIQUE(recording_id, position)
            );
            CREATE INDEX IF NOT EXISTS idx_tracks_recording ON tracks(recording_id);
            CREATE INDEX IF NOT EXISTS idx_tracks_song ON tracks(song_id);

            CREATE TABLE IF NOT EXISTS performance_facts (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                song_id          INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
                show_date        TEXT NOT NULL,
                recording_id     INTEGER NOT NULL REFERENCES recordings(id) ON DELETE CASCADE,
                duration_seconds REAL NOT NULL,
                segment_count    INTEGER NOT NULL DEFAULT 1,
                is_outlier       INTEGER NOT NULL DEFAULT 0,
                eligible         INTEGER NOT NULL DEFAULT 1,

                UNIQUE(song_id, recording_id)
            );
            CREATE INDEX IF NOT EXISTS idx_facts_song ON performance_facts(song_id);
            CREATE INDEX IF NOT EXISTS idx_facts_date ON performance_facts(show_date);

            CREATE TABLE IF NOT EXISTS review_queue (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                raw_title   TEXT NOT NULL,
                cleaned     TEXT NOT NULL,
                song_id     INTEGER REFERENCES songs(id) ON DELETE CASCADE,
                similarity  REAL,
                -- 'fuzzy_flagged': provisional 0.65-0.85 binding
                -- 'new_song': no match, new identity created
                reason      TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }
}
