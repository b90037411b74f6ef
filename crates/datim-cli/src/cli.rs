//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use datim_cli::types::ReportFormat;
use datim_model::{OutputLayout, PipelineKind};

#[derive(Parser)]
#[command(
    name = "datim",
    version,
    about = "Aggregate HIV program line lists into DATIM facility indicators",
    long_about = "Aggregate HIV program line lists into DATIM facility indicators.\n\n\
                  Reads every CSV or Excel extract in a directory, counts each indicator\n\
                  per facility for one reporting quarter and writes an Excel workbook\n\
                  (or CSV files) with one table per report group."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw cell values (lab results, free text) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// ART treatment line list (TX_CURR, TX_PVLS, TX_NEW, TX_ML, TB, CXCA).
    Radet(RunArgs),
    /// HIV testing services register.
    Hts(RunArgs),
    /// Index testing register.
    HtsIndex(RunArgs),
    /// Antenatal HIV testing register.
    PmtctHts(RunArgs),
    /// Pre-exposure prophylaxis register.
    Prep(RunArgs),
    /// List a pipeline's indicators and the columns each one reads.
    Indicators {
        #[arg(value_enum)]
        pipeline: PipelineArg,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Directory holding the CSV and Excel extracts.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// First day of the reporting quarter (default: the pipeline's current quarter).
    #[arg(long, value_name = "YYYY-MM-DD", requires = "end")]
    pub start: Option<NaiveDate>,

    /// Last day of the reporting quarter.
    #[arg(long, value_name = "YYYY-MM-DD", requires = "start")]
    pub end: Option<NaiveDate>,

    /// Output directory (default: <INPUT_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Split reports per project or write one table (default depends on the pipeline).
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Report file format.
    #[arg(long, value_enum, default_value = "xlsx")]
    pub format: FormatArg,

    /// Skip the viral load, CD4 and testing-setting audit tables.
    #[arg(long = "no-audit")]
    pub no_audit: bool,

    /// Also write the run summary as JSON.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PipelineArg {
    Radet,
    Hts,
    HtsIndex,
    PmtctHts,
    Prep,
}

impl From<PipelineArg> for PipelineKind {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::Radet => Self::Radet,
            PipelineArg::Hts => Self::Hts,
            PipelineArg::HtsIndex => Self::HtsIndex,
            PipelineArg::PmtctHts => Self::PmtctHts,
            PipelineArg::Prep => Self::Prep,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    PerProject,
    Single,
}

impl From<LayoutArg> for OutputLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::PerProject => Self::PerProject,
            LayoutArg::Single => Self::Single,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Csv,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => Self::Xlsx,
            FormatArg::Csv => Self::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
