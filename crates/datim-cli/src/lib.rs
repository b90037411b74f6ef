//! Library side of the `datim` command: logging, run orchestration and the
//! CSV report writer. The binary only adds argument parsing and the summary
//! table.

pub mod logging;
pub mod pipeline;
pub mod report;
pub mod types;
