use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("key column '{column}' is not in the normalized table")]
    MissingKeyColumn { column: String },

    #[error("facility table has no '{column}' column")]
    UnknownColumn { column: String },

    #[error("failed to build facility table: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
