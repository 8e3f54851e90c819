//! Time utilities: 5-field cron schedules, loose duration parsing, and
//! remaining-time formatting.

pub mod cron;

pub use cron::{Cron, CronError};

use chrono::Duration;

/// Parses a loose duration of the form `[+|-]N[dhms]`, e.g. `10h`, `-30s`.
///
/// Returns `None` for anything that does not match the shape; callers treat
/// that as "no duration configured".
pub fn parse_duration_loose(input: &str) -> Option<Duration> {
    let mut s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim().to_string();
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest.trim().to_string();
    }
    if s.is_empty() {
        return None;
    }

    let unit = s.chars().last()?;
    let number: i64 = s[..s.len() - unit.len_utf8()].trim().parse().ok()?;

    let duration = match unit {
        'd' => Duration::days(number),
        'h' => Duration::hours(number),
        'm' => Duration::minutes(number),
        's' => Duration::seconds(number),
        _ => return None,
    };
    Some(if negative { -duration } else { duration })
}

/// Formats a second count as `HH:MM:SS`, prefixed with `Nd ` when at least a
/// day remains. Negative inputs clamp to zero.
pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let days = total / 86_400;
    let rem = total % 86_400;
    let hours = rem / 3_600;
    let minutes = (rem % 3_600) / 60;
    let seconds = rem % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_loose("10h"), Some(Duration::hours(10)));
        assert_eq!(parse_duration_loose("8m"), Some(Duration::minutes(8)));
        assert_eq!(parse_duration_loose("30s"), Some(Duration::seconds(30)));
        assert_eq!(parse_duration_loose("1d"), Some(Duration::days(1)));
    }

    #[test]
    fn test_parse_duration_signs() {
        assert_eq!(parse_duration_loose("-30s"), Some(Duration::seconds(-30)));
        assert_eq!(parse_duration_loose("+5m"), Some(Duration::minutes(5)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration_loose(""), None);
        assert_eq!(parse_duration_loose("10"), None);
        assert_eq!(parse_duration_loose("h"), None);
        assert_eq!(parse_duration_loose("tens"), None);
        assert_eq!(parse_duration_loose("-"), None);
        assert_eq!(parse_duration_loose("5天"), None);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3_661), "01:01:01");
        assert_eq!(format_hms(86_400 + 7_384), "1d 02:03:04");
        assert_eq!(format_hms(-5), "00:00:00");
    }
}
