//! Formatting utilities for CLI output.

use chrono::Duration;

/// Format a large number with commas for readability.
///
/// # Examples
///
/// ```
/// use mr_cli_common::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

/// Format a duration as seconds, or minutes and seconds past a minute.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use mr_cli_common::format_duration;
///
/// assert_eq!(format_duration(Duration::milliseconds(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    if millis < 60_000 {
        format!("{:.2}s", millis as f64 / 1000.0)
    } else {
        let secs = millis / 1000;
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;
        if hours > 0 {
            format!("{hours}h {minutes}m {seconds}s")
        } else {
            format!("{minutes}m {seconds}s")
        }
    }
}
