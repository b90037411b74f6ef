//! Facility key validation.

use polars::prelude::*;
use tracing::warn;

use crate::error::{IngestError, Result};

/// Placeholder for a blank facility key cell.
pub const UNKNOWN_KEY: &str = "UNKNOWN";

/// Checks that every key column exists and fills blank key cells with
/// [`UNKNOWN_KEY`], so such records still group and count.
pub fn require_key_columns(df: &mut DataFrame, keys: &[&str]) -> Result<()> {
    for key in keys {
        let column = df
            .column(key)
            .map_err(|_| IngestError::MissingKeyColumn {
                column: (*key).to_string(),
            })?
            .cast(&DataType::String)?;

        let filled: StringChunked = column
            .str()?
            .into_iter()
            .map(|value| Some(value.filter(|v| !v.trim().is_empty()).unwrap_or(UNKNOWN_KEY)))
            .collect();
        let filled = filled.with_name((*key).into());

        let all_unknown = filled.into_iter().all(|v| v == Some(UNKNOWN_KEY));
        if all_unknown && df.height() > 0 {
            warn!(column = *key, "key column is entirely blank; all records grouped as UNKNOWN");
        }

        df.with_column(filled.into_series())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blanks_become_unknown() {
        let mut df = DataFrame::new(vec![
            Series::new("Facility".into(), &[Some("Kubwa"), None, Some(" ")]).into_column(),
        ])
        .unwrap();
        require_key_columns(&mut df, &["Facility"]).unwrap();
        let values: Vec<_> = df
            .column("Facility")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(values, vec!["Kubwa", "UNKNOWN", "UNKNOWN"]);
    }

    #[test]
    fn missing_key_is_fatal() {
        let mut df = DataFrame::new(vec![
            Series::new("Facility".into(), &["Kubwa"]).into_column(),
        ])
        .unwrap();
        let err = require_key_columns(&mut df, &["Facility", "DatimId"]).unwrap_err();
        assert!(matches!(err, IngestError::MissingKeyColumn { column } if column == "DatimId"));
    }
}
