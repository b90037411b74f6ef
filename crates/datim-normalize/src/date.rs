//! Date cell parsing.
//!
//! Extracts mix ISO dates, European day-first dates and occasional timestamps.
//! Only complete calendar dates are accepted; partial values such as `2025-07`
//! are reported as invalid rather than guessed.

use chrono::{NaiveDate, NaiveDateTime};
use datim_model::DateValue;

/// Parses a raw date cell.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use datim_model::DateValue;
/// use datim_normalize::parse_date;
///
/// let july = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
/// assert_eq!(parse_date(Some("2025-07-15")), DateValue::Valid(july));
/// assert_eq!(parse_date(Some("15/07/2025")), DateValue::Valid(july));
/// assert_eq!(parse_date(None), DateValue::Missing);
/// assert!(matches!(parse_date(Some("2025-07")), DateValue::Invalid(_)));
/// ```
pub fn parse_date(raw: Option<&str>) -> DateValue {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return DateValue::Missing;
    };

    try_parse_datetime(value)
        .map(|dt| dt.date())
        .or_else(|| try_parse_date(value))
        .map_or_else(|| DateValue::Invalid(value.to_string()), DateValue::Valid)
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    // Day-first wins when both readings are valid.
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y",
        "%d-%B-%Y",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%d.%m.%Y",
        "%d-%m-%Y",
        "%d %b %Y",
        "%d %B %Y",
        "%b %d, %Y",
        "%B %d, %Y",
        "%Y%m%d",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}
