pub mod nonsong;
pub mod segments;
pub mod title;

pub use nonsong::is_non_song;
pub use segments::{SegmentLabel, strip_segment_label};
pub use title::clean_title;

/// The outcome of running one raw title through the per-track stages.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedTitle {
    /// No single song in this title (combo track, bare identifier, note).
    Dropped,
    /// Not a performance of any song (tuning, crowd, tape flip).
    NonSong,
    /// A song title, ready for resolution. `resolve_key` has segment
    /// labels removed; `display` keeps the cleaned original casing.
    Song { display: String, resolve_key: String },
}

/// Stages 1-3 of the per-track pipeline: clean, classify, strip labels.
pub fn normalize_title(raw: &str) -> NormalizedTitle {
    let Some(cleaned) = clean_title(raw) else {
        return NormalizedTitle::Dropped;
    };
    if is_non_song(&cleaned) {
        return NormalizedTitle::NonSong;
    }
    let (resolve_key, _label) = strip_segment_label(&cleaned);
    NormalizedTitle::Song {
        display: cleaned,
        resolve_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_compose() {
        assert_eq!(
            normalize_title("d1t01 - Dark Star V1"),
            NormalizedTitle::Song {
                display: "Dark Star V1".to_string(),
                resolve_key: "Dark Star".to_string(),
            }
        );
    }

    #[test]
    fn non_song_short_circuits_resolution() {
        assert_eq!(normalize_title("01 Tuning"), NormalizedTitle::NonSong);
        assert_eq!(normalize_title("- encore break -"), NormalizedTitle::NonSong);
    }

    #[test]
    fn combo_track_dropped() {
        assert_eq!(
            normalize_title("Help > Slip > Franklin's"),
            NormalizedTitle::Dropped
        );
    }

    #[test]
    fn reprise_keeps_its_identity_through_the_stack() {
        assert_eq!(
            normalize_title("04 - Playing in the Band Reprise"),
            NormalizedTitle::Song {
                display: "Playing in the Band Reprise".to_string(),
                resolve_key: "Playing in the Band Reprise".to_string(),
            }
        );
    }
}
