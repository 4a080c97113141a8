//! Non-musical track classification.
//!
//! Runs after title cleaning and before song resolution so spurious
//! "songs" (tuning, crowd noise, tape flips) never pollute the canonical
//! dictionary. Tracks flagged here keep `song_id = NULL` but are retained
//! in storage for data-quality auditing.

use regex::Regex;
use std::sync::LazyLock;

/// Cleaned titles matching these exactly are non-songs.
const NON_SONG_WORDS: &[&str] = &[
    "tuning",
    "tune up",
    "tune-up",
    "crowd",
    "crowd noise",
    "audience",
    "encore break",
    "set break",
    "intermission",
    "break",
    "banter",
    "stage banter",
    "stage talk",
    "rap",
    "dead air",
    "silence",
    "blank",
    "noodling",
    "noodle",
    "warm up",
    "warmup",
    "warm-up",
    "soundcheck",
    "intro",
    "introduction",
    "introductions",
    "band introductions",
    "band introduction",
    "band intro",
    "applause",
    "cheering",
    "fade in",
    "fade out",
    "fade-in",
    "fade-out",
    "fades in",
    "fades out",
    "tape flip",
    "tape break",
    "tape change",
    "set up",
    "setup",
    "announcements",
    "announcement",
    "mc",
    "preshow",
    "pre-show",
    "pre show",
    "radio interview",
    "radio interviews",
    "interview",
    "commentary",
    "spoken word",
    "rain delay",
    "unknown",
    "untitled",
    "not available",
    "missing",
];

/// Keywords that mark a title as a non-song when they end it:
/// "Polka Tuning", "Bill Graham intro", "Bobby Banter".
const TRAILING_NON_SONG: &[&str] = &[
    "tuning",
    "crowd",
    "banter",
    "stage talk",
    "dead air",
    "noodling",
    "soundcheck",
    "introduction",
    "introductions",
    "applause",
    "crowd noise",
    "warmup",
    "warm-up",
];

// Compound delimiters: "crowd/tuning", "Crowd & Tuning", "tuning + crowd"
static COMPOUND_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*/\s*|\s*&\s*|\s+and\s+|\s*\+\s*|\s+-\s+").unwrap());

/// Whether a cleaned title is a non-song (tuning, crowd, banter, etc.).
///
/// Compound forms like "Encore Break/Crowd/Tuning" count when ALL parts
/// are non-song words.
pub fn is_non_song(cleaned: &str) -> bool {
    let lower = cleaned.to_lowercase();
    let lower = lower.trim();
    if lower.is_empty() {
        return true;
    }
    if NON_SONG_WORDS.contains(&lower) {
        return true;
    }
    let parts: Vec<&str> = COMPOUND_SPLIT_RE
        .split(lower)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() > 1 {
        // Compound titles stand or fall as a whole: one real song part
        // keeps the track musical
        return parts.iter().all(|p| NON_SONG_WORDS.contains(p));
    }
    TRAILING_NON_SONG
        .iter()
        .any(|keyword| lower.ends_with(&format!(" {keyword}")))
}
