//! Time display formatting.
//!
//! The overlay renders every timer kind through the same clock format, so
//! this is the only place that turns seconds into text.

use crate::TimerRecord;

/// Format whole seconds as `H:MM:SS`, or `M:SS` below one hour.
///
/// # Examples
/// ```
/// use tabtimer_types::formatting::format_clock;
/// assert_eq!(format_clock(0), "0:00");
/// assert_eq!(format_clock(65), "1:05");
/// assert_eq!(format_clock(3600), "1:00:00");
/// assert_eq!(format_clock(90061), "25:01:01");
/// ```
pub fn format_clock(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Display text for a timer record.
pub fn format_record(record: &TimerRecord) -> String {
    format_clock(record.time)
}

/// Fraction of the cycle (or countdown) still remaining, `1.0` = full.
///
/// Returns `None` when there is no meaningful total to compare against.
pub fn remaining_fraction(time: u64, total: u64) -> Option<f32> {
    if total == 0 {
        return None;
    }
    Some((time as f32 / total as f32).clamp(0.0, 1.0))
}
