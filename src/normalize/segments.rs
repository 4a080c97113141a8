//! Segment-label handling for songs split across multiple tracks.
//!
//! A label can mean one of two opposite things, so the decision is a
//! tagged classification over two disjoint, explicitly enumerated marker
//! sets — never inferred by pattern similarity:
//!
//! - **Continuation** markers ("V2", "part 2", "verse 2", "continued")
//!   label parts of ONE performance. They are stripped so every part
//!   resolves to the same canonical song.
//! - **Distinct-derivative** markers ("Reprise", "Slight Return") denote a
//!   musically distinct composition. They are never stripped — stripping
//!   would wrongly collapse two different songs into one identity.
//!
//! Add a new marker to exactly one set.

use regex::Regex;
use std::sync::LazyLock;

/// How a title's trailing label was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLabel {
    /// Continuation of the same performance; label stripped.
    Continuation,
    /// A distinct derivative work; title left intact.
    Distinct,
    /// No recognized label.
    None,
}

// Continuation markers: "Dark Star V2", "Space, part 1", "(verse 2)",
// "Playing in the Band continued"
static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s,]*\(?(?:v\d+|verse\s+\d+|part\s+\d+|continued)\)?\s*$").unwrap()
});

// Distinct-derivative markers. Checked first: a title carrying one of
// these must keep its full identity.
static DISTINCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:reprise|slight\s+return)\)?\s*$").unwrap());

/// Classify and strip a cleaned title's segment label. Returns the string
/// used for song resolution and the classification tag.
pub fn strip_segment_label(cleaned: &str) -> (String, SegmentLabel) {
    if DISTINCT_RE.is_match(cleaned) {
        return (cleaned.to_string(), SegmentLabel::Distinct);
    }
    if CONTINUATION_RE.is_match(cleaned) {
        let stripped = CONTINUATION_RE.replace(cleaned, "").trim().to_string();
        // A title that was nothing but a marker is left untouched
        if !stripped.is_empty() {
            return (stripped, SegmentLabel::Continuation);
        }
    }
    (cleaned.to_string(), SegmentLabel::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_markers_stripped() {
        assert_eq!(
            strip_segment_label("Dark Star V1"),
            ("Dark Star".to_string(), SegmentLabel::Continuation)
        );
        assert_eq!(
            strip_segment_label("Dark Star verse 2"),
            ("Dark Star".to_string(), SegmentLabel::Continuation)
        );
    }

    #[test]
    fn part_markers_stripped() {
        assert_eq!(
            strip_segment_label("Space, part 1"),
            ("Space".to_string(), SegmentLabel::Continuation)
        );
        assert_eq!(
            strip_segment_label("Terrapin Station (part 2)"),
            ("Terrapin Station".to_string(), SegmentLabel::Continuation)
        );
    }

    #[test]
    fn continued_marker_stripped() {
        assert_eq!(
            strip_segment_label("Playing in the Band continued"),
            ("Playing in the Band".to_string(), SegmentLabel::Continuation)
        );
    }

    #[test]
    fn reprise_never_stripped() {
        assert_eq!(
            strip_segment_label("Playing in the Band Reprise"),
            ("Playing in the Band Reprise".to_string(), SegmentLabel::Distinct)
        );
        assert_eq!(
            strip_segment_label("Tweezer Reprise"),
            ("Tweezer Reprise".to_string(), SegmentLabel::Distinct)
        );
    }

    #[test]
    fn slight_return_never_stripped() {
        assert_eq!(
            strip_segment_label("Voodoo Child (Slight Return)"),
            ("Voodoo Child (Slight Return)".to_string(), SegmentLabel::Distinct)
        );
    }

    #[test]
    fn unlabeled_titles_untouched() {
        assert_eq!(
            strip_segment_label("Dark Star"),
            ("Dark Star".to_string(), SegmentLabel::None)
        );
        assert_eq!(
            strip_segment_label("Morning Dew"),
            ("Morning Dew".to_string(), SegmentLabel::None)
        );
    }

    #[test]
    fn marker_only_title_untouched() {
        // "Continued" alone carries no base song to resolve to
        assert_eq!(
            strip_segment_label("Continued"),
            ("Continued".to_string(), SegmentLabel::None)
        );
    }
}
