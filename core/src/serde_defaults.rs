//! Common default values for timer records
//!
//! Used by record creation, stored-record normalization and resets so the
//! numbers only live in one place.

use chrono::Duration;

/// Initial remaining time of a new countdown timer
pub const DEFAULT_COUNTDOWN_SECS: u64 = 600;

/// Cycle length of a new cyclic timer, and the fallback for records without one
pub const DEFAULT_CYCLE_SECS: u64 = 3600;

/// Default grace window before a cyclic timer restarts
pub const DEFAULT_RESET_GRACE_SECS: u64 = 10;

/// Alpha component every background color is normalized to
pub const BACKGROUND_ALPHA: &str = "0.4";

/// How far in the future a new target-date countdown points
pub fn default_target_offset() -> Duration {
    Duration::days(1)
}
