//! Timestamp parsing for AI-provided time strings.
//!
//! The model reports when each characteristic is best observed in the video,
//! but the format varies: plain seconds ("45"), minutes:seconds ("1:10"), or
//! occasionally malformed text. These times anchor overlay annotations, so
//! parsing is total: anything unrecognized becomes 0 seconds rather than an
//! error.

/// Parse a time string to total seconds.
///
/// Supported forms:
/// - plain number, already in seconds (`"45"`, `"12.5"`)
/// - `M:SS` (`"1:10"` -> 70.0)
/// - everything else (empty, garbage, extra colons) -> 0.0
///
/// # Examples
/// ```
/// use fsight_models::timestamp::parse_time_to_seconds;
/// assert_eq!(parse_time_to_seconds("2:05"), 125.0);
/// assert_eq!(parse_time_to_seconds("45"), 45.0);
/// assert_eq!(parse_time_to_seconds(""), 0.0);
/// ```
pub fn parse_time_to_seconds(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }

    if let Ok(seconds) = raw.parse::<f64>() {
        return seconds;
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 2 {
        if let (Ok(minutes), Ok(seconds)) =
            (parts[0].trim().parse::<i64>(), parts[1].trim().parse::<i64>())
        {
            return (minutes * 60 + seconds) as f64;
        }
    }

    0.0
}

/// Format seconds as `M:SS`, or `H:MM:SS` above an hour.
///
/// Used for marker labels next to the playback timeline.
pub fn format_seconds(total_secs: f64) -> String {
    let total = total_secs.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse_time_to_seconds("2:05"), 125.0);
        assert_eq!(parse_time_to_seconds("0:45"), 45.0);
        assert_eq!(parse_time_to_seconds("1:10"), 70.0);
        assert_eq!(parse_time_to_seconds("10:00"), 600.0);
    }

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse_time_to_seconds("45"), 45.0);
        assert_eq!(parse_time_to_seconds("0"), 0.0);
        assert_eq!(parse_time_to_seconds("12.5"), 12.5);
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(parse_time_to_seconds(" 2:05 "), 125.0);
        assert_eq!(parse_time_to_seconds("2 : 05"), 125.0);
    }

    #[test]
    fn test_parse_unrecognized_is_zero() {
        assert_eq!(parse_time_to_seconds(""), 0.0);
        assert_eq!(parse_time_to_seconds("   "), 0.0);
        assert_eq!(parse_time_to_seconds("abc"), 0.0);
        assert_eq!(parse_time_to_seconds("1:2:3"), 0.0);
        assert_eq!(parse_time_to_seconds("1:xx"), 0.0);
        assert_eq!(parse_time_to_seconds(":30"), 0.0);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0:00");
        assert_eq!(format_seconds(70.0), "1:10");
        assert_eq!(format_seconds(125.9), "2:05");
        assert_eq!(format_seconds(3661.0), "1:01:01");
    }
}
