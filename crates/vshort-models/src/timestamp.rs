//! Timestamp parsing and formatting.
//!
//! Start offsets can be given as plain seconds (`1300`, `90.5`) or as clock
//! time (`21:40`, `00:21:40.250`).

use thiserror::Error;

/// Maximum accepted offset (24 hours in seconds).
pub const MAX_TIMESTAMP_SECS: f64 = 86400.0;

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use SS, MM:SS or HH:MM:SS[.mmm]")]
    InvalidFormat(String),

    #[error("Timestamp exceeds maximum of {} hours", .0 / 3600.0)]
    ExceedsMax(f64),
}

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use vshort_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    const COMPONENTS: [&str; 3] = ["hours", "minutes", "seconds"];
    const WEIGHTS: [f64; 3] = [3600.0, 60.0, 1.0];

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    // Align from the right: "SS", "MM:SS", "HH:MM:SS".
    let offset = 3 - parts.len();
    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let slot = offset + i;
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| TimestampError::InvalidValue(COMPONENTS[slot], part.to_string()))?;
        if !value.is_finite() {
            return Err(TimestampError::InvalidValue(COMPONENTS[slot], part.to_string()));
        }
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total += value * WEIGHTS[slot];
    }

    if total > MAX_TIMESTAMP_SECS {
        return Err(TimestampError::ExceedsMax(MAX_TIMESTAMP_SECS));
    }

    Ok(total)
}

/// Format seconds as `HH:MM:SS` or `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    // Round once so carries propagate (59.9996 -> 00:01:00).
    let total_ms = (total_secs.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let mins = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    if millis > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse_timestamp("1300").unwrap(), 1300.0);
        assert!((parse_timestamp("90.5").unwrap() - 90.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_timestamp("21:40").unwrap(), 1300.0);
        assert_eq!(parse_timestamp("00:21:40").unwrap(), 1300.0);
        assert!((parse_timestamp("00:00:30.250").unwrap() - 30.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_timestamp("  "), Err(TimestampError::Empty));
        assert_eq!(parse_timestamp("-5"), Err(TimestampError::Negative));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("ab:10"),
            Err(TimestampError::InvalidValue("minutes", _))
        ));
        assert!(matches!(
            parse_timestamp("25:00:01"),
            Err(TimestampError::ExceedsMax(_))
        ));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(568.0), "00:09:28");
        assert_eq!(format_seconds(3661.5), "01:01:01.500");
    }

    #[test]
    fn test_format_seconds_rounds_before_carry() {
        assert_eq!(format_seconds(59.9996), "00:01:00");
        assert_eq!(format_seconds(3599.9999), "01:00:00");
        assert_eq!(format_seconds(30.2504), "00:00:30.250");
    }
}
