//! Polars cell helpers.
//!
//! Source extracts arrive as text, but a merged frame may still carry numeric
//! columns (for instance after a caller builds one by hand). These helpers give
//! every stage one way of reading a cell.

use polars::prelude::*;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats floats without trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use datim_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
/// assert_eq!(any_to_string(AnyValue::Float64(2.50)), "2.5");
/// assert_eq!(any_to_string(AnyValue::String("Active")), "Active");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number without trailing zeros.
///
/// # Examples
///
/// ```
/// use datim_common::format_numeric;
///
/// assert_eq!(format_numeric(40.0), "40");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True for absent cells and cells holding only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Reads a column as optional text, one entry per row.
///
/// Non-string columns are cast to `String` first; nulls stay `None`.
pub fn string_cells(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_numbers() {
        assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::Float64(1600.0)), "1600");
    }

    #[test]
    fn test_format_numeric_keeps_integers() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(1000.0), "1000");
        assert_eq!(format_numeric(0.25), "0.25");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(" 34 "), Some(34.0));
        assert_eq!(parse_f64("4.5"), Some(4.5));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("thirty"), None);
        assert_eq!(parse_f64("NaN"), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some(" x ")));
    }

    #[test]
    fn test_string_cells_casts_numbers() {
        let df = DataFrame::new(vec![
            Series::new("Age".into(), &[Some(30i64), None]).into_column(),
        ])
        .unwrap();
        let cells = string_cells(&df, "Age").unwrap();
        assert_eq!(cells, vec![Some("30".to_string()), None]);
    }

    #[test]
    fn test_string_cells_missing_column() {
        let df = DataFrame::empty();
        assert!(string_cells(&df, "Sex").is_err());
    }
}
