//! Evaluation and aggregation core.
//!
//! Takes a normalized table and an indicator catalog, evaluates every
//! indicator into a cohort, counts cohorts per facility and splits the result
//! into report groups. No I/O happens here.

pub mod aggregate;
pub mod error;
pub mod evaluate;
pub mod partition;

pub use aggregate::{FacilityTable, aggregate};
pub use error::{CoreError, Result};
pub use evaluate::{Cohort, CohortStatus, Evaluation, evaluate};
pub use partition::{MAX_GROUP_NAME, ReportGroup, partition, sanitize_group_name};
