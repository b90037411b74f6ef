//! Normalized clinical cell values.

use chrono::NaiveDate;
use serde::Serialize;

/// CD4 counts above this value are treated as data-entry errors.
pub const CD4_CEILING: f64 = 1600.0;

/// A date cell after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DateValue {
    /// Cell was empty.
    Missing,
    /// Cell held text that did not parse to a full calendar date.
    Invalid(String),
    Valid(NaiveDate),
}

impl DateValue {
    pub fn valid(&self) -> Option<NaiveDate> {
        match self {
            Self::Valid(date) => Some(*date),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// A viral load result. Anything that is not a finite number becomes `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ViralLoad {
    Value(f64),
    Null,
}

impl ViralLoad {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Null => None,
        }
    }
}

/// A CD4 count cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Cd4Count {
    /// Cell was empty.
    Missing,
    /// Cell held the literal `NULL` or non-numeric text.
    Null,
    Value(f64),
}

/// Bucket used by the CD4 breakdown of new initiations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cd4Class {
    /// Numeric and at most [`CD4_CEILING`].
    Valid,
    /// Numeric but above [`CD4_CEILING`].
    Excess,
    /// Missing, `NULL`, or non-numeric.
    Unknown,
}

impl Cd4Count {
    pub fn classify(self) -> Cd4Class {
        match self {
            Self::Value(v) if v <= CD4_CEILING => Cd4Class::Valid,
            Self::Value(_) => Cd4Class::Excess,
            Self::Missing | Self::Null => Cd4Class::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd4_ceiling_is_inclusive() {
        assert_eq!(Cd4Count::Value(1600.0).classify(), Cd4Class::Valid);
        assert_eq!(Cd4Count::Value(1600.5).classify(), Cd4Class::Excess);
        assert_eq!(Cd4Count::Value(0.0).classify(), Cd4Class::Valid);
    }

    #[test]
    fn cd4_null_and_missing_are_unknown() {
        assert_eq!(Cd4Count::Null.classify(), Cd4Class::Unknown);
        assert_eq!(Cd4Count::Missing.classify(), Cd4Class::Unknown);
    }

    #[test]
    fn date_value_valid_accessor() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(DateValue::Valid(date).valid(), Some(date));
        assert_eq!(DateValue::Invalid("2025-07".into()).valid(), None);
        assert!(!DateValue::Missing.is_valid());
    }

    #[test]
    fn date_value_serializes_tagged() {
        let json = serde_json::to_string(&DateValue::Invalid("13/45/2025".into())).unwrap();
        assert_eq!(json, r#"{"kind":"invalid","value":"13/45/2025"}"#);
    }

    #[test]
    fn viral_load_value() {
        assert_eq!(ViralLoad::Value(20.0).value(), Some(20.0));
        assert_eq!(ViralLoad::Null.value(), None);
    }
}
