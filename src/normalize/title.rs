//! Title cleaning: strip recording/format noise from a raw track title.
//!
//! The cascade is a fixed, total function — rules run in order, an
//! unmatched pattern leaves that part of the title untouched. Order
//! matters: later rules assume earlier noise is gone.

use regex::Regex;
use std::sync::LazyLock;

// Bracketed metadata as the entire title: "[crowd]", "[signals]"
static BRACKET_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.*\]$").unwrap());

// Surrounding dashes: "- encore break -", "--dead air--"
static LEADING_DASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-–—]+\s*").unwrap());
static TRAILING_DASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-–—]+$").unwrap());

// Entire title in parens: "(Tuning)", "(fade in)"
static PAREN_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([^)]+)\)$").unwrap());

// Leading reel markers: "//St. Stephen"
static REEL_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^//\s*").unwrap());

// Encore prefixes: "e: Keep Your Day Job", "Encore: U.S. Blues"
static ENCORE_E_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s*]*[Ee]:\s*").unwrap());
static ENCORE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Ee]ncore:\s*").unwrap());

// Timestamp prefixes: "00:11] tuning", "10:16.41| Wharf Rat", "12:54 ] Drums"
static TIMESTAMP_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?::\d{2})*(?:\.\d+)?\s*[\]|]\s*").unwrap());
static TIMESTAMP_SPACED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}:\d{2}\s+\]\s*").unwrap());

// "Disc103-CC Rider", "t01.Set Up"
static DISC_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Disc\d+-").unwrap());
static T_DOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^t\d+\.\s*").unwrap());

// Date-prefix tracks get dropped: "05/85 - Thursday", "95-02-20 211 Crowd"
static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}[-/]\d{2,4}\s").unwrap());
static YYMMDD_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{2}\s").unwrap());

// Leading asterisks/slashes (recording notes): "*Desolation Row"
static LEADING_STARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s(e)]*[*/]+\s*").unwrap());

// Multi-song combo tracks: "Help > Slip > Franklin's". Dropped entirely —
// other releases split them properly, so extraction would double count.
static COMBO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[A-Za-z'"]\s*(?:->|→|>)\s*[A-Za-z(]"#).unwrap());

// Leading track numbers: "1.", "01.", "1)", "12 ."
static TRACK_NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[.)]\s*").unwrap());

// Archive identifier family. Most specific first.
// Full identifier as the entire title: "GD 1987-03-22.GEMS.d01t01"
static GD_FULL_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gd[\s-]?\d{2,4}[-.\s]\S*$").unwrap());
// "gd19790902.18.stella blue"
static GD_COMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gd\d{8}\.\d+\.").unwrap());
// "GD1995-03-19 05. Don't Ease"
static GD_DATE_TRACKNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gd\d{4}-\d{2}-\d{2}\s+\d+\.\s*").unwrap());
// "gd94-03-21 12 Liberty"
static GD_SHORT_DATE_TRACKNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gd\d{2}-\d{2}-\d{2}\s+\d+\s+").unwrap());
// "GD 01 6-18-83 ..." (numbered file dumps, whole title is an identifier)
static GD_NUMBERED_DUMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gd\s+\d+\s+\d{1,2}-\d{1,2}-\d{2,4}\b.*$").unwrap());
// "gd77-05-08d1t01 - Title", "gd81-12-28 s2t07 Title"
static GD_DISC_TRACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^gd\d{2,4}-?\d{2}-?\d{2}\s*(?:[ds]\d+\s*)?t\d+\s*[-–—.]?\s*").unwrap()
});
// "gd88-06-25 Sugaree" — date followed directly by the song. The captured
// remainder is checked in code so set/track codes are not eaten here.
static GD_DATE_SONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gd\d{2,4}-?\d{2}-?\d{2}\s+(.*)$").unwrap());
static SET_TRACK_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ds]\d").unwrap());
// "d1t01 - Title", "d1t01 Title". A bare code with nothing after it is
// left for the bare-identifier drop below.
static D_T_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^d\d+t\d+(?:\s*[-–—.]\s*|\s+)").unwrap());
// "Disc01,Track01 Title", "GD-Disc02,Track11"
static DISC_COMMA_TRACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:gd[\s-]?)?Disc\d+\s*,\s*Track\d+\s*").unwrap());
// Bare disc/track codes with no song: "D1T12", "disc305", "4-26-69d1t03"
static BARE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^D\d+T?\d*$").unwrap());
static BARE_DISC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^disc\d+$").unwrap());
static DATE_DISC_TRACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}-\d{1,2}-\d{2,4}[dD]\d+[tT]\d+").unwrap());
// 'Disc five, track seven: "Jam into Days Between'
static SPELLED_DISC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Disc\s+\w+\s*,\s*track\s+\w+\s*:\s*").unwrap());

// Tape-flip dotted names: "Dru..ms" → "Drums"
static DOTTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.+").unwrap());

// "2-01 Tuning", "02_Mississippi Half-Step"
static DISC_DASH_TRACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-\d+\s+").unwrap());
static UNDERSCORE_NUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+_").unwrap());

// Bare track number: "01 Hell In A Bucket", "900 crowd". The remainder must
// start with a letter or paren so "29 Rainy Day Women #12..." is left alone.
static BARE_TRACK_NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}\s+([A-Za-z(].*)$").unwrap());
// "01 - Title" (number + spaced dash)
static NUM_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+[-–—]\s+").unwrap());

// Trailing footnote markers: "[a]", "[1]"
static FOOTNOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[[a-z0-9]+\]\s*$").unwrap());

// Trailing symbols: "Wang Dang Doodle *", "encore break~~"
static TRAILING_SYMBOLS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[->=→]*\s*[*#~+]+\s*$").unwrap());
static E_PAREN_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(e\)\s*").unwrap());

// Recording metadata annotations: "(2 AUD Matrix)", "(audience recording)"
static RECORDING_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\((?:\d+\s+)?(?:AUD|SBD|audience)[^)]*\)\s*").unwrap()
});
static X_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(X\)\s*").unwrap());

// Tape flip annotations: "(Tape Flip After Song)"
static TAPE_FLIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(tape\s+flip[^)]*\)").unwrap());

// Bracketed durations: "Saint Stephen [6:05]"
static BRACKET_DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[\d+:\d{2}\]\s*;?\s*").unwrap());

// Trailing ", Set Break"
static SET_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),\s*set\s+break\s*$").unwrap());

// Trailing segue markers: ">", "->", "→"
static SEGUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-?[>→]+\s*$").unwrap());

// Trailing duration: "– 14:35", "- 5:32"
static TRAILING_DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[–\-—]\s*\d+:\d{2}(?::\d{2})?\s*$").unwrap());

// Writer credits and metadata after a closing quote
static QUOTE_CREDITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*-?[>→]?\s*\([^)]+\)\s*$"#).unwrap());
static QUOTE_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*[–\-—]\s*$"#).unwrap());
static QUOTE_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*-?[>→(–\-—].*$"#).unwrap());
static QUOTE_PART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)",?\s*part\s+\d+\s*$"#).unwrap());

// Set annotations: "[Set 1]", "(Set 2)", "(Encore)"
static SET_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*[\[(](?:Set|Disc|Encore)\s*\d*[\])]").unwrap());

// Reel metadata: "(reel #2 side B; 8-track 15 ips)"
static REEL_META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(reel\s+[^)]+\)").unwrap());

// Trailing asterisks left after everything else
static FINAL_SYMBOLS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*#~]+\s*$").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Clean a raw track title. Returns `None` for titles that carry no single
/// song: multi-song combo tracks, bare disc/track identifiers, date-only
/// prefixes, and tape-note descriptions.
pub fn clean_title(raw: &str) -> Option<String> {
    // Take only the first line (discard venue/date info on later lines),
    // and drop archive escaped-newline backslashes.
    let mut s = raw
        .trim()
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_end_matches('\\')
        .to_string();

    s = BRACKET_ONLY_RE.replace(&s, "").trim().to_string();
    s = LEADING_DASHES_RE.replace(&s, "").to_string();
    s = TRAILING_DASHES_RE.replace(&s, "").to_string();
    s = PAREN_ONLY_RE.replace(&s, "$1").to_string();
    s = REEL_MARKER_RE.replace(&s, "").to_string();
    s = ENCORE_E_RE.replace(&s, "").to_string();
    s = ENCORE_WORD_RE.replace(&s, "").to_string();
    s = TIMESTAMP_PREFIX_RE.replace(&s, "").to_string();
    s = TIMESTAMP_SPACED_RE.replace(&s, "").to_string();
    s = DISC_DASH_RE.replace(&s, "").to_string();
    s = T_DOT_RE.replace(&s, "").to_string();

    if DATE_PREFIX_RE.is_match(&s) || YYMMDD_PREFIX_RE.is_match(&s) {
        return None;
    }

    s = LEADING_STARS_RE.replace(&s, "").to_string();

    // Combo tracks are dropped unless the arrow is a tape-flip annotation.
    if COMBO_RE.is_match(&s) && !s.contains("(Tape Flip") {
        return None;
    }

    s = TRACK_NUM_RE.replace(&s, "").to_string();
    s = GD_FULL_IDENT_RE.replace(&s, "").trim().to_string();
    s = GD_COMPACT_RE.replace(&s, "").to_string();
    s = GD_DATE_TRACKNUM_RE.replace(&s, "").to_string();
    s = GD_SHORT_DATE_TRACKNUM_RE.replace(&s, "").to_string();
    s = GD_NUMBERED_DUMP_RE.replace(&s, "").trim().to_string();
    s = GD_DISC_TRACK_RE.replace(&s, "").to_string();
    // Date directly followed by a song name. Only strip when the remainder
    // is not itself a set/track code (those were handled above).
    if let Some(caps) = GD_DATE_SONG_RE.captures(&s) {
        let rest = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if !SET_TRACK_CODE_RE.is_match(rest) {
            s = rest.to_string();
        }
    }
    s = D_T_PREFIX_RE.replace(&s, "").to_string();
    s = DISC_COMMA_TRACK_RE.replace(&s, "").to_string();

    if BARE_CODE_RE.is_match(&s) || BARE_DISC_RE.is_match(&s) || DATE_DISC_TRACK_RE.is_match(&s) {
        return None;
    }

    s = SPELLED_DISC_RE.replace(&s, "").to_string();
    s = DOTTED_RE.replace_all(&s, "").to_string();
    s = DISC_DASH_TRACK_RE.replace(&s, "").to_string();
    s = UNDERSCORE_NUM_RE.replace(&s, "").to_string();
    s = BARE_TRACK_NUM_RE.replace(&s, "$1").to_string();
    s = NUM_DASH_RE.replace(&s, "").to_string();

    // Normalize fancy quotes to straight
    s = s
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'")
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"");

    s = FOOTNOTE_RE.replace(&s, "").to_string();
    s = TRAILING_SYMBOLS_RE.replace(&s, "").to_string();
    s = E_PAREN_PREFIX_RE.replace(&s, "").to_string();
    s = RECORDING_META_RE.replace_all(&s, "").to_string();
    s = X_PREFIX_RE.replace(&s, "").to_string();
    s = TAPE_FLIP_RE.replace_all(&s, "").to_string();
    s = BRACKET_DURATION_RE.replace(&s, "").to_string();
    s = SET_BREAK_RE.replace(&s, "").to_string();
    // Segue markers first: the arrow may precede a trailing duration
    s = SEGUE_RE.replace(&s, "").to_string();
    s = TRAILING_DURATION_RE.replace(&s, "").to_string();
    s = QUOTE_CREDITS_RE.replace(&s, "").to_string();
    s = QUOTE_DASH_RE.replace(&s, "").to_string();
    s = QUOTE_TAIL_RE.replace(&s, "").to_string();
    s = QUOTE_PART_RE.replace(&s, "").to_string();
    s = SET_ANNOTATION_RE.replace_all(&s, "").to_string();
    s = REEL_META_RE.replace_all(&s, "").to_string();

    // Strip surrounding matched quote pairs (not lone apostrophes like Truckin')
    if (s.starts_with('"') && s.ends_with('"') && s.len() > 1)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() > 2)
    {
        s = s[1..s.len() - 1].to_string();
    } else if s.starts_with('"') && !s[1..].contains('"') {
        s = s[1..].to_string();
    }

    s = SEGUE_RE.replace(&s, "").to_string();
    s = FINAL_SYMBOLS_RE.replace(&s, "").to_string();
    s = WHITESPACE_RE.replace_all(&s, " ").trim().to_string();

    if s.is_empty() {
        return None;
    }

    // Real song titles are rarely this long — longer strings are tape
    // notes, venue descriptions, or recording metadata.
    if s.len() > 80 {
        return None;
    }

    // Mostly numbers/punctuation with few letters: leftover identifiers.
    let letters = s.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 || (letters < 3 && s.len() > 3) {
        return None;
    }

    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> Option<String> {
        clean_title(raw)
    }

    #[test]
    fn plain_title_passes_through() {
        assert_eq!(clean("Dark Star").as_deref(), Some("Dark Star"));
    }

    #[test]
    fn disc_track_prefix_stripped() {
        assert_eq!(
            clean("d1t01 - Scarlet Begonias").as_deref(),
            Some("Scarlet Begonias")
        );
        assert_eq!(clean("d2t05. Bertha").as_deref(), Some("Bertha"));
        assert_eq!(clean("d1t01 Playing in the Band").as_deref(), Some("Playing in the Band"));
    }

    #[test]
    fn gd_identifier_prefix_stripped() {
        assert_eq!(
            clean("gd77-05-08d1t01 - Scarlet Begonias").as_deref(),
            Some("Scarlet Begonias")
        );
        assert_eq!(
            clean("gd81-12-28 s2t07 Sugaree").as_deref(),
            Some("Sugaree")
        );
        assert_eq!(clean("gd88-06-25 Sugaree").as_deref(), Some("Sugaree"));
    }

    #[test]
    fn full_identifier_as_title_dropped() {
        assert_eq!(clean("GD 1987-03-22.GEMS.d01t01"), None);
        assert_eq!(clean("D1T12"), None);
        assert_eq!(clean("disc305"), None);
        assert_eq!(clean("4-26-69d1t03"), None);
    }

    #[test]
    fn leading_track_numbers_stripped() {
        assert_eq!(clean("01. Bertha").as_deref(), Some("Bertha"));
        assert_eq!(clean("1) Bertha").as_deref(), Some("Bertha"));
        assert_eq!(
            clean("01 Hell In A Bucket").as_deref(),
            Some("Hell In A Bucket")
        );
        assert_eq!(clean("01 - Bertha").as_deref(), Some("Bertha"));
        assert_eq!(clean("02_Mississippi Half-Step").as_deref(), Some("Mississippi Half-Step"));
    }

    #[test]
    fn number_in_song_name_survives() {
        // Leading track number goes, the #12/#35 in the title stay
        let r = clean("29 Rainy Day Women #12 And #35");
        assert_eq!(r.as_deref(), Some("Rainy Day Women #12 And #35"));
    }

    #[test]
    fn timestamp_prefix_stripped() {
        assert_eq!(clean("10:16.41| Wharf Rat").as_deref(), Some("Wharf Rat"));
        assert_eq!(clean("12:54 ] Drums").as_deref(), Some("Drums"));
    }

    #[test]
    fn encore_prefix_stripped() {
        assert_eq!(
            clean("e: Keep Your Day Job").as_deref(),
            Some("Keep Your Day Job")
        );
        assert_eq!(clean("Encore: U.S. Blues").as_deref(), Some("U.S. Blues"));
    }

    #[test]
    fn segue_marker_stripped() {
        assert_eq!(clean("Scarlet Begonias >").as_deref(), Some("Scarlet Begonias"));
        assert_eq!(clean("China Cat Sunflower ->").as_deref(), Some("China Cat Sunflower"));
    }

    #[test]
    fn combo_tracks_dropped() {
        assert_eq!(clean("Help > Slip > Franklin's"), None);
        assert_eq!(clean("Drums > Space"), None);
    }

    #[test]
    fn tape_flip_arrow_is_not_a_combo() {
        assert_eq!(clean("Space > (Tape Flip Near Start)").as_deref(), Some("Space"));
    }

    #[test]
    fn recording_annotations_stripped() {
        assert_eq!(
            clean("Casey Jones (audience recording)").as_deref(),
            Some("Casey Jones")
        );
        assert_eq!(clean("Wharf Rat (2 AUD Matrix)").as_deref(), Some("Wharf Rat"));
    }

    #[test]
    fn bracketed_duration_stripped() {
        assert_eq!(clean("Saint Stephen [6:05]").as_deref(), Some("Saint Stephen"));
        assert_eq!(clean("Morning Dew - 14:35").as_deref(), Some("Morning Dew"));
    }

    #[test]
    fn trailing_symbols_stripped_internal_kept() {
        assert_eq!(clean("Wang Dang Doodle *").as_deref(), Some("Wang Dang Doodle"));
        assert_eq!(clean("Slipknot!").as_deref(), Some("Slipknot!"));
    }

    #[test]
    fn dotted_tape_flip_names_repaired() {
        assert_eq!(clean("Dru..ms").as_deref(), Some("Drums"));
    }

    #[test]
    fn date_prefixed_notes_dropped() {
        assert_eq!(clean("05/85 - Thursday"), None);
        assert_eq!(clean("95-02-20 211 Crowd"), None);
    }

    #[test]
    fn long_descriptions_dropped() {
        let long = "This is a very long tape note describing the venue, the weather, \
                    the crowd and the recording rig in great detail";
        assert_eq!(clean(long), None);
    }

    #[test]
    fn set_annotation_stripped() {
        assert_eq!(clean("Bertha [Set 1]").as_deref(), Some("Bertha"));
        assert_eq!(clean("Sugaree (Set 2)").as_deref(), Some("Sugaree"));
    }

    #[test]
    fn fancy_quotes_normalized() {
        assert_eq!(clean("Truckin\u{2019}").as_deref(), Some("Truckin'"));
    }

    #[test]
    fn empty_and_symbol_only_dropped() {
        assert_eq!(clean(""), None);
        assert_eq!(clean("   "), None);
        assert_eq!(clean("-- -- --"), None);
    }

    #[test]
    fn first_line_only() {
        assert_eq!(
            clean("Dark Star\nBarton Hall, Cornell University").as_deref(),
            Some("Dark Star")
        );
    }
}
