//! Parsers for the value formats the platform API returns.
//!
//! - Video durations arrive as ISO 8601 durations (`PT4M13S`)
//! - Timestamps arrive as RFC 3339 strings (`2023-05-01T12:00:00Z`)

use crate::error::{CatalogError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Date designators in the order they must appear. Calendar units use
/// fixed lengths: a year is 365 days, a month 30 days.
const DATE_UNITS: [(char, u64); 4] = [('Y', 365 * DAY), ('M', 30 * DAY), ('W', 7 * DAY), ('D', DAY)];

const TIME_UNITS: [(char, u64); 3] = [('H', HOUR), ('M', MINUTE), ('S', 1)];

/// Parse an ISO 8601 duration such as `PT1H2M3S` or `P1DT30M` into seconds.
///
/// Live streams report `P0D`, which parses to zero.
pub fn parse_iso8601_duration(value: &str) -> Result<u64> {
    let invalid = || CatalogError::InvalidDuration(value.to_string());

    let rest = value.trim().strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((_, "")) => return Err(invalid()),
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total = sum_components(date_part, &DATE_UNITS).ok_or_else(invalid)?;
    if let Some(time) = time_part {
        let seconds = sum_components(time, &TIME_UNITS).ok_or_else(invalid)?;
        total = total.checked_add(seconds).ok_or_else(invalid)?;
    }
    Ok(total)
}

/// Sum `<digits><designator>` pairs, enforcing designator order.
fn sum_components(part: &str, units: &[(char, u64)]) -> Option<u64> {
    let mut total: u64 = 0;
    let mut digits = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        if digits.is_empty() {
            return None;
        }
        let offset = units[next_unit..].iter().position(|(unit, _)| *unit == ch)?;
        let (_, multiplier) = units[next_unit + offset];
        let amount: u64 = digits.parse().ok()?;
        total = total.checked_add(amount.checked_mul(multiplier)?)?;
        next_unit += offset + 1;
        digits.clear();
    }

    // Trailing digits without a designator
    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Format a timestamp the way the platform expects query parameters.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_time_only_durations() {
        assert_eq!(parse_iso8601_duration("PT4M13S").unwrap(), 253);
        assert_eq!(parse_iso8601_duration("PT1H").unwrap(), 3600);
        assert_eq!(parse_iso8601_duration("PT45S").unwrap(), 45);
        assert_eq!(parse_iso8601_duration("PT1H2M3S").unwrap(), 3723);
    }

    #[test]
    fn test_parse_date_and_time_durations() {
        assert_eq!(parse_iso8601_duration("P1DT30M").unwrap(), DAY + 30 * MINUTE);
        assert_eq!(parse_iso8601_duration("P1W").unwrap(), 7 * DAY);
        assert_eq!(parse_iso8601_duration("P1Y2M").unwrap(), 365 * DAY + 60 * DAY);
    }

    #[test]
    fn test_parse_live_stream_duration() {
        assert_eq!(parse_iso8601_duration("P0D").unwrap(), 0);
    }

    #[test]
    fn test_parse_invalid_durations() {
        for bad in ["", "P", "PT", "4M13S", "PT4X", "PTM", "PT13S4M", "PT12", "P1DT"] {
            assert!(
                parse_iso8601_duration(bad).is_err(),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_timestamp_normalizes_to_utc() {
        let parsed = parse_timestamp("2023-05-01T21:00:00+09:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02T03:04:05Z");
    }
}
