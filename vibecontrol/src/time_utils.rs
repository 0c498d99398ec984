//! Time formatting for the now-playing display.

/// Formats milliseconds as `m:ss`, or `h:mm:ss` from one hour on.
///
/// Sub-second remainders are truncated, the way a progress label counts.
///
/// # Examples
/// ```
/// # use vibecontrol::time_utils::format_progress;
/// assert_eq!(format_progress(0), "0:00");
/// assert_eq!(format_progress(13_999), "0:13");
/// assert_eq!(format_progress(200_000), "3:20");
/// assert_eq!(format_progress(3_723_000), "1:02:03");
/// ```
pub fn format_progress(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Fraction of `duration_ms` covered by `progress_ms`, in `[0.0, 1.0]`.
///
/// A zero duration yields `0.0`.
pub fn progress_fraction(progress_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (progress_ms.min(duration_ms) as f64) / (duration_ms as f64)
}
