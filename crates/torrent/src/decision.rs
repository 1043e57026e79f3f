//! Tolerance-based verdict on the archive count

use serde::Serialize;

/// Outcome of comparing the rar file count with the caller's tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// No rar files at all
    Clean,
    /// Some rar files, but no more than the tolerance allows
    WithinTolerance,
    /// More rar files than the tolerance allows
    ExceedsTolerance,
}

/// Map an archive count and a tolerance to a decision
///
/// A tolerance of 0 means any rar file exceeds it.
pub fn decide(archive_count: usize, tolerance: u8) -> Decision {
    match archive_count {
        0 => Decision::Clean,
        n if n > usize::from(tolerance) => Decision::ExceedsTolerance,
        _ => Decision::WithinTolerance,
    }
}
