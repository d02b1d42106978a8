//! Display formatting for playback times and publish dates.

use chrono::{DateTime, Local};

/// Format a position or duration in seconds as `M:SS`, or `H:MM:SS` once it
/// reaches an hour.
///
/// Returns `None` for zero, negative and non-finite input; callers keep
/// whatever text they were already showing.
pub fn format_time(secs: f64) -> Option<String> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    let total = secs.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        Some(format!("{}:{:02}:{:02}", hours, minutes, seconds))
    } else {
        Some(format!("{}:{:02}", minutes, seconds))
    }
}

/// Local calendar date (`M/D/YYYY`) for an epoch timestamp.
pub fn format_date(epoch_secs: i64) -> Option<String> {
    let utc = DateTime::from_timestamp(epoch_secs, 0)?;
    Some(utc.with_timezone(&Local).format("%-m/%-d/%Y").to_string())
}

/// Like [`format_date`], with `Not Available` for missing or zero timestamps.
pub fn date_label(epoch_secs: Option<i64>) -> String {
    epoch_secs
        .filter(|ts| *ts != 0)
        .and_then(format_date)
        .unwrap_or_else(|| "Not Available".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_writes_nothing() {
        assert_eq!(format_time(0.0), None);
        assert_eq!(format_time(-3.0), None);
        assert_eq!(format_time(f64::NAN), None);
        assert_eq!(format_time(f64::INFINITY), None);
    }

    #[test]
    fn test_sub_second_renders_zero() {
        assert_eq!(format_time(0.5).as_deref(), Some("0:00"));
        assert_eq!(format_time(0.01).as_deref(), Some("0:00"));
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(format_time(5.0).as_deref(), Some("0:05"));
        assert_eq!(format_time(65.0).as_deref(), Some("1:05"));
        assert_eq!(format_time(65.9).as_deref(), Some("1:05"));
        assert_eq!(format_time(754.0).as_deref(), Some("12:34"));
    }

    #[test]
    fn test_hours_pad_minutes() {
        assert_eq!(format_time(3605.0).as_deref(), Some("1:00:05"));
        assert_eq!(format_time(3600.0 + 9.0 * 60.0).as_deref(), Some("1:09:00"));
        assert_eq!(format_time(2.0 * 3600.0 + 45.0 * 60.0 + 7.0).as_deref(), Some("2:45:07"));
    }

    #[test]
    fn test_date_label_missing() {
        assert_eq!(date_label(None), "Not Available");
        assert_eq!(date_label(Some(0)), "Not Available");
    }

    #[test]
    fn test_date_label_shape() {
        // 2021-06-15T12:00:00Z; the day depends on the local offset.
        let label = date_label(Some(1_623_758_400));
        assert!(label.starts_with("6/1"), "{label}");
        assert!(label.ends_with("/2021"), "{label}");
    }
}
