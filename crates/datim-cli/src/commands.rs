use std::fs;

use anyhow::{Context, Result};
use comfy_table::Table;
use datim_indicators::spec;
use datim_model::{PipelineKind, ReportingPeriod};
use datim_cli::pipeline::{RunConfig, default_period, run_pipeline};
use datim_cli::types::RunSummary;

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

pub fn run_indicators(pipeline: PipelineKind) -> Result<()> {
    let catalog = spec(pipeline).catalog;
    let mut table = Table::new();
    table.set_header(vec!["#", "Indicator", "Columns"]);
    apply_table_style(&mut table);
    for (position, listing) in catalog.listing().into_iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            listing.name,
            listing.requires.join(", "),
        ]);
    }
    println!("{pipeline}: {} indicators", catalog.len());
    println!("{table}");
    Ok(())
}

pub fn run_report(pipeline: PipelineKind, args: &RunArgs) -> Result<RunSummary> {
    let period = match (args.start, args.end) {
        (Some(start), Some(end)) => {
            ReportingPeriod::new(start, end).context("invalid reporting period")?
        }
        _ => default_period(pipeline)?,
    };
    let config = RunConfig {
        pipeline,
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| args.input_dir.join("output")),
        input_dir: args.input_dir.clone(),
        period,
        layout: args
            .layout
            .map_or_else(|| pipeline.default_layout(), Into::into),
        format: args.format.into(),
        write_audits: !args.no_audit,
    };

    let summary = run_pipeline(&config)?;

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(summary)
}
