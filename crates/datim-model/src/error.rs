use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("reporting period start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("window derived from {anchor} falls outside the supported calendar")]
    DateOutOfRange { anchor: NaiveDate },
}

pub type Result<T> = std::result::Result<T, ModelError>;
