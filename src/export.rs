//! Performance-fact export for downstream analysis.
//!
//! Emits the full fact stream as JSON, ordered by song then show date.
//! Outlier and ineligible facts are included with their flags intact;
//! filtering is the consumer's decision.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::db::Database;

/// Write all facts as a JSON array to `out`, or stdout when `out` is
/// `None`. Returns the number of facts written.
pub fn export_json(db: &Database, out: Option<&Path>) -> Result<usize> {
    let facts = db.export_facts()?;
    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut w = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut w, &facts)?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        None => {
            let stdout = io::stdout().lock();
            let mut w = BufWriter::new(stdout);
            serde_json::to_writer_pretty(&mut w, &facts)?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
    }
    Ok(facts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Coverage, NewRecording, SourceType};

    #[test]
    fn writes_facts_with_flags() {
        let db = Database::open_in_memory().unwrap();
        let song = db.get_or_create_song("Dark Star", "song").unwrap();
        // Facts reference recordings, so the rows must exist
        for source_id in ["rec-0", "rec-1"] {
            db.insert_recording(&NewRecording {
                source_type: SourceType::ArchivalAudioSource,
                source_id: source_id.to_string(),
                title: None,
                show_date: None,
                venue: None,
                region: None,
                trust_rank: 100,
                coverage: Coverage::Complete,
            })
            .unwrap();
        }
        db.insert_fact(song, "1972-08-27", 1, 1620.0, 2, true).unwrap();
        db.insert_fact(song, "1973-02-09", 2, 900.0, 1, false).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        let written = export_json(&db, Some(&path)).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["song"], "Dark Star");
        assert_eq!(arr[0]["duration_seconds"], 1620.0);
        assert_eq!(arr[0]["eligible"], true);
        assert_eq!(arr[1]["eligible"], false);
    }
}
