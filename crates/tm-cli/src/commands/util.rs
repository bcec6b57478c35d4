//! Shared output helpers.

use chrono::TimeDelta;

/// Formats a duration as whole-second `1h 2m 3s` text, omitting leading
/// zero components.
#[must_use]
pub fn format_duration(duration: TimeDelta) -> String {
    let secs = duration.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
