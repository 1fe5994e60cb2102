//! Display conversions for probe values.
//!
//! All functions here are pure. Absent or zero inputs map to `None` so that
//! callers can write them out as an explicit null marker.

use std::fmt::Display;

/// Units used by [`format_file_size`], smallest first.
pub const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Unit for [`convert_bitrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateUnit {
    Mbps,
    Kbps,
}

impl BitrateUnit {
    fn divisor(&self) -> f64 {
        match self {
            BitrateUnit::Mbps => 1_000_000.0,
            BitrateUnit::Kbps => 1_000.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BitrateUnit::Mbps => "Mbps",
            BitrateUnit::Kbps => "Kbps",
        }
    }
}

impl std::fmt::Display for BitrateUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scale a byte count to the first unit where the value drops below 1024.
///
/// `TB` is the last unit; values beyond it are not divided further.
pub fn scale_file_size(bytes: u64) -> (f64, &'static str) {
    let last = SIZE_UNITS.len() - 1;
    let mut size = bytes as f64;
    let mut idx = 0;

    while size >= 1024.0 && idx < last {
        size /= 1024.0;
        idx += 1;
    }

    (size, SIZE_UNITS[idx])
}

/// Format a byte count, e.g. `1610612736` -> `"1.50 GB"`.
pub fn format_file_size(bytes: u64) -> String {
    let (size, unit) = scale_file_size(bytes);
    format!("{:.2} {}", size, unit)
}

/// Convert bits per second to a display string, e.g. `"45.21 Mbps"`.
pub fn convert_bitrate(bits_per_second: Option<i64>, unit: BitrateUnit) -> Option<String> {
    match bits_per_second {
        Some(bps) if bps != 0 => Some(format!("{:.2} {}", bps as f64 / unit.divisor(), unit)),
        _ => None,
    }
}

/// Interpret a probe duration as whole milliseconds.
///
/// Every decimal point is removed before parsing, so `"12345.6"` becomes
/// `123456`. mediainfo reports durations as fractional seconds with three
/// decimals, which this turns into milliseconds.
pub fn duration_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    raw.replace('.', "").parse::<i64>().ok()
}

/// Format a probe duration as `HH:MM:SS`.
pub fn format_duration(raw: &str) -> Option<String> {
    let millis = duration_millis(raw).filter(|ms| *ms > 0)?;
    let total_seconds = millis / 1000;

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
}

/// True for UHD (3840x2160) and DCI 4K (4096x2160).
pub fn is_4k_resolution(width: u32, height: u32) -> bool {
    matches!((width, height), (3840, 2160) | (4096, 2160))
}

/// Return the first value whose string form is not blank.
pub fn coalesce<I, T>(values: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
    T: Display,
{
    values
        .into_iter()
        .flatten()
        .find(|value| !value.to_string().trim().is_empty())
}

/// Remove a `cd/m2` unit suffix, e.g. `"1000 cd/m2"` -> `"1000"`.
pub fn strip_luminance_unit(raw: &str) -> String {
    raw.replace("cd/m2", "").trim().to_string()
}

/// Parse an integer, truncating a decimal value toward zero.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_units() {
        assert_eq!(format_file_size(0), "0.00 B");
        assert_eq!(format_file_size(1023), "1023.00 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536 * 1024 * 1024), "1.50 GB");
        assert_eq!(format_file_size(5 * 1024u64.pow(4)), "5.00 TB");
    }

    #[test]
    fn test_scaled_size_stays_below_1024_until_tb() {
        let mut samples = vec![0u64, 1, 1023, 1024, 1025, u64::MAX];
        for exp in 1..=5u32 {
            let base = 1024u64.pow(exp);
            samples.extend([base - 1, base, base + 1, base * 3 / 2]);
        }

        for bytes in samples {
            let (value, unit) = scale_file_size(bytes);
            assert!(value >= 0.0);
            if unit != "TB" {
                assert!(value < 1024.0, "{} scaled to {} {}", bytes, value, unit);
            }
        }

        // Past the last unit nothing is divided further
        let (value, unit) = scale_file_size(4096 * 1024u64.pow(4));
        assert_eq!(unit, "TB");
        assert_eq!(value, 4096.0);
    }

    #[test]
    fn test_convert_bitrate() {
        assert_eq!(
            convert_bitrate(Some(45_210_000), BitrateUnit::Mbps),
            Some("45.21 Mbps".to_string())
        );
        assert_eq!(
            convert_bitrate(Some(640_000), BitrateUnit::Kbps),
            Some("640.00 Kbps".to_string())
        );
        assert_eq!(convert_bitrate(Some(0), BitrateUnit::Mbps), None);
        assert_eq!(convert_bitrate(None, BitrateUnit::Kbps), None);
    }

    #[test]
    fn test_duration_strips_decimal_point() {
        assert_eq!(duration_millis("12345.6"), Some(123456));
        assert_eq!(format_duration("12345.6"), format_duration("123456"));
        assert_eq!(format_duration("12345.6").as_deref(), Some("00:02:03"));
    }

    #[test]
    fn test_format_duration() {
        // mediainfo style: seconds with millisecond precision
        assert_eq!(format_duration("7322.042").as_deref(), Some("02:02:02"));
        assert_eq!(format_duration("3600000").as_deref(), Some("01:00:00"));
        assert_eq!(format_duration("0"), None);
        assert_eq!(format_duration(""), None);
        assert_eq!(format_duration("n/a"), None);
    }

    #[test]
    fn test_is_4k_resolution() {
        assert!(is_4k_resolution(3840, 2160));
        assert!(is_4k_resolution(4096, 2160));
        assert!(!is_4k_resolution(1920, 1080));
        assert!(!is_4k_resolution(3840, 1600));
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(coalesce([None, Some("  "), Some("x"), Some("y")]), Some("x"));
        assert_eq!(coalesce::<_, &str>([None, Some("")]), None);
        assert_eq!(coalesce([None, Some(0), Some(3)]), Some(0));
    }

    #[test]
    fn test_strip_luminance_unit() {
        assert_eq!(strip_luminance_unit("1000 cd/m2"), "1000");
        assert_eq!(strip_luminance_unit(" 400cd/m2 "), "400");
        assert_eq!(strip_luminance_unit("532"), "532");
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer(" 23.976 "), Some(23));
        assert_eq!(parse_integer("abc"), None);
    }
}
