//! Coverage gate for timing statistics.
//!
//! A recording's coverage tag says whether its track durations can be
//! trusted as performance durations. The gate decides statistics
//! eligibility only; ineligible facts are still stored and exported.

use crate::db::models::Coverage;

/// Whether facts from a recording with this coverage may enter timing
/// statistics. `edited` releases trim, fade, and overdub; `unknown` has
/// not been vetted, and unvetted timing data is worse than none.
pub fn is_timing_eligible(coverage: Coverage) -> bool {
    matches!(coverage, Coverage::Complete | Coverage::Unedited)
}
