//! Advisory progress derived from poll attempts.
//!
//! The remote engines do not report real progress over the polling API, so
//! the poller synthesizes a percentage from its attempt counter. The value
//! is advisory only and never reaches 100 before a terminal state.

/// Ceiling for synthesized progress while a task is still non-terminal.
pub const MAX_ADVISORY_PROGRESS: u8 = 95;

/// Compute the advisory progress percentage for a poll attempt.
///
/// Scales `attempt / max_attempts` onto 0-100, then clamps into
/// `1..=`[`MAX_ADVISORY_PROGRESS`] so the first tick already shows motion
/// and the bar never completes while the task is in flight.
pub fn poll_progress(attempt: u32, max_attempts: u32) -> u8 {
    if max_attempts == 0 {
        return 0;
    }
    let scaled = u64::from(attempt) * 100 / u64::from(max_attempts);
    scaled.min(u64::from(MAX_ADVISORY_PROGRESS)).max(1) as u8
}
