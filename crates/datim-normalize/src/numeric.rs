//! Numeric cell parsing.

use datim_common::parse_f64;

/// Parses an age in years. Negative values are treated as missing.
pub fn parse_age(raw: Option<&str>) -> Option<f64> {
    raw.and_then(parse_f64).filter(|age| *age >= 0.0)
}

/// Parses a plain count such as months of ARV refill.
pub fn parse_count(raw: Option<&str>) -> Option<f64> {
    raw.and_then(parse_f64)
}
