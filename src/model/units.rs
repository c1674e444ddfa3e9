//! Human-facing unit helpers: running times and byte counts.

use thiserror::Error;

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// A running time label that could not be converted to seconds.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid duration '{text}': expected up to three '{delimiter}'-separated numbers")]
pub struct DurationFormatError {
    pub text: String,
    pub delimiter: String,
}

/// Converts `"HH:MM:SS"`, `"MM:SS"` or `"SS"` into whole seconds.
///
/// The rightmost part is seconds, then minutes, then hours.
///
/// # Errors
///
/// Returns [`DurationFormatError`] when a part is not a non-negative integer
/// or when there are more than three parts.
pub fn duration_to_seconds(text: &str, delimiter: &str) -> Result<u64, DurationFormatError> {
    let invalid = || DurationFormatError {
        text: text.to_string(),
        delimiter: delimiter.to_string(),
    };

    let parts: Vec<&str> = text.trim().split(delimiter).collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let mut seconds = 0_u64;
    for (exponent, part) in parts.iter().rev().enumerate() {
        let value: u64 = part.trim().parse().map_err(|_| invalid())?;
        // exponent is at most 2
        seconds += value * 60_u64.pow(u32::try_from(exponent).map_err(|_| invalid())?);
    }
    Ok(seconds)
}

/// Formats a byte count with a binary unit, rounded to two decimals.
///
/// `4200` becomes `"4.1 KB"`, `42` becomes `"42.0 B"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn convert_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{rounded:?} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_hours_minutes_seconds() {
        assert_eq!(duration_to_seconds("69:42:23", ":"), Ok(250_943));
    }

    #[test]
    fn test_duration_minutes_seconds() {
        assert_eq!(duration_to_seconds("42:23", ":"), Ok(2543));
    }

    #[test]
    fn test_duration_seconds_only() {
        assert_eq!(duration_to_seconds("23", ":"), Ok(23));
    }

    #[test]
    fn test_duration_custom_delimiter() {
        assert_eq!(duration_to_seconds("69-42-23", "-"), Ok(250_943));
    }

    #[test]
    fn test_duration_rejects_text() {
        let err = duration_to_seconds("foobar", ":").unwrap_err();
        assert_eq!(err.text, "foobar");
    }

    #[test]
    fn test_duration_rejects_wrong_delimiter() {
        assert!(duration_to_seconds("69:42:23", "-").is_err());
    }

    #[test]
    fn test_duration_rejects_more_than_three_parts() {
        assert!(duration_to_seconds("1:2:3:4", ":").is_err());
    }

    #[test]
    fn test_convert_size_bytes() {
        assert_eq!(convert_size(42), "42.0 B");
    }

    #[test]
    fn test_convert_size_kilobytes() {
        assert_eq!(convert_size(4200), "4.1 KB");
    }

    #[test]
    fn test_convert_size_megabytes() {
        assert_eq!(convert_size(4_200_000), "4.01 MB");
    }

    #[test]
    fn test_convert_size_gigabytes() {
        assert_eq!(convert_size(4_200_000_000), "3.91 GB");
    }

    #[test]
    fn test_convert_size_terabytes() {
        assert_eq!(convert_size(4_200_000_000_000), "3.82 TB");
    }

    #[test]
    fn test_convert_size_zero() {
        assert_eq!(convert_size(0), "0 B");
    }
}
