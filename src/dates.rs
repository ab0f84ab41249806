//! Timestamp parsing for the sheet's free-text date columns.

use chrono::{NaiveDate, NaiveDateTime};

/// The format the sheet exports, e.g. `March 5, 2024, 14:30`.
pub const SHEET_FORMAT: &str = "%B %d, %Y, %H:%M";

const FALLBACK_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a sheet timestamp into a naive local instant.
///
/// Anything that is blank or matches neither the sheet format nor one of the
/// ISO-style fallbacks is unknown, reported as `None`. This never fails.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, SHEET_FORMAT) {
        return Some(ts);
    }

    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_sheet_format() {
        assert_eq!(
            parse_timestamp("March 5, 2024, 14:30"),
            Some(at(2024, 3, 5, 14, 30))
        );
        assert_eq!(
            parse_timestamp("December 25, 2023, 09:05"),
            Some(at(2023, 12, 25, 9, 5))
        );
    }

    #[test]
    fn test_sheet_format_tolerates_padding_and_abbreviations() {
        assert_eq!(
            parse_timestamp("  Jan 01, 2024, 10:00 "),
            Some(at(2024, 1, 1, 10, 0))
        );
    }

    #[test]
    fn test_iso_fallbacks() {
        assert_eq!(
            parse_timestamp("2024-03-05 14:30:00"),
            Some(at(2024, 3, 5, 14, 30))
        );
        assert_eq!(
            parse_timestamp("2024-03-05T14:30:00"),
            Some(at(2024, 3, 5, 14, 30))
        );
        assert_eq!(parse_timestamp("2024-03-05"), Some(at(2024, 3, 5, 0, 0)));
    }

    #[test]
    fn test_unknown_inputs() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("nan"), None);
        assert_eq!(parse_timestamp("March 32, 2024, 14:30"), None);
        assert_eq!(parse_timestamp("5 March 2024"), None);
    }
}
