//! `datim` command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use datim_cli::logging::{LogConfig, LogFormat, init_logging};
use datim_cli::types::RunSummary;
use datim_model::PipelineKind;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_indicators, run_report};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match cli.command {
        Command::Radet(args) => finish(run_report(PipelineKind::Radet, &args)),
        Command::Hts(args) => finish(run_report(PipelineKind::Hts, &args)),
        Command::HtsIndex(args) => finish(run_report(PipelineKind::HtsIndex, &args)),
        Command::PmtctHts(args) => finish(run_report(PipelineKind::PmtctHts, &args)),
        Command::Prep(args) => finish(run_report(PipelineKind::Prep, &args)),
        Command::Indicators { pipeline } => match run_indicators(pipeline.into()) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn finish(result: anyhow::Result<RunSummary>) -> i32 {
    match result {
        Ok(summary) => {
            print_summary(&summary);
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// `--log-level` wins over `-v/-q`; `RUST_LOG` applies only when neither is given.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        log_file: cli.log_file.clone(),
        log_data: cli.log_data,
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
