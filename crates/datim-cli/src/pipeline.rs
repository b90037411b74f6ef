//! One run of one pipeline: ingest, normalize, evaluate, aggregate, write.
//!
//! Each stage runs inside its own span and logs a completion event with
//! counts and `duration_ms`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use datim_core::{Evaluation, FacilityTable, aggregate, evaluate, partition};
use datim_indicators::spec;
use datim_ingest::ingest_directory;
use datim_model::{OutputLayout, PipelineKind, ReportingPeriod};
use datim_normalize::{NormalizationReport, build_audits, normalize};
use tracing::{debug, info, info_span, warn};

use crate::logging::redact_value;
use crate::report::{write_audit_tables, write_report_groups};
use crate::types::{IndicatorCount, ReportFormat, RunSummary};

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pipeline: PipelineKind,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub period: ReportingPeriod,
    pub layout: OutputLayout,
    pub format: ReportFormat,
    pub write_audits: bool,
}

/// The quarter each pipeline reports on when no dates are given.
pub fn default_period(pipeline: PipelineKind) -> Result<ReportingPeriod> {
    let (start, end) = match pipeline {
        PipelineKind::Radet | PipelineKind::Hts | PipelineKind::PmtctHts => {
            ((2025, 7, 1), (2025, 9, 30))
        }
        PipelineKind::HtsIndex => ((2025, 1, 1), (2025, 3, 31)),
        PipelineKind::Prep => ((2025, 4, 1), (2025, 6, 30)),
    };
    let date = |(y, m, d): (i32, u32, u32)| {
        NaiveDate::from_ymd_opt(y, m, d).with_context(|| format!("invalid date {y}-{m}-{d}"))
    };
    ReportingPeriod::new(date(start)?, date(end)?).context("build default reporting period")
}

/// Windows are still computed for a non-quarter period; the warning is the
/// only consequence.
pub fn check_quarter_alignment(pipeline: PipelineKind, period: &ReportingPeriod) -> bool {
    let aligned = period.is_calendar_quarter();
    if !aligned {
        if pipeline.expects_calendar_quarter() {
            warn!(
                %pipeline,
                start = %period.start(),
                end = %period.end(),
                "reporting period is not a calendar quarter; treatment windows assume one"
            );
        } else {
            debug!(%pipeline, "reporting period is not a calendar quarter");
        }
    }
    aligned
}

pub fn run_pipeline(config: &RunConfig) -> Result<RunSummary> {
    let pipeline_span = info_span!("pipeline", pipeline = %config.pipeline);
    let _pipeline_guard = pipeline_span.enter();

    let spec = spec(config.pipeline);
    check_quarter_alignment(config.pipeline, &config.period);

    let ingest_start = Instant::now();
    let ingested = info_span!("ingest", input_dir = %config.input_dir.display())
        .in_scope(|| ingest_directory(&config.input_dir, spec.keys))
        .with_context(|| format!("ingest {}", config.input_dir.display()))?;
    info!(
        files = ingested.files.len(),
        skipped_files = ingested.skipped.len(),
        records = ingested.frame.height(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    let normalize_start = Instant::now();
    let (table, mut normalization) = info_span!("normalize")
        .in_scope(|| normalize(&ingested.frame, &spec.plan))
        .context("normalize extract")?;
    redact_samples(&mut normalization);
    info!(
        records = table.len(),
        issues = normalization.issues.len(),
        duration_ms = normalize_start.elapsed().as_millis(),
        "normalize complete"
    );

    let evaluate_start = Instant::now();
    let evaluation =
        info_span!("evaluate").in_scope(|| evaluate(&table, &spec.catalog, &config.period));
    info!(
        indicators = evaluation.cohorts().len(),
        skipped = evaluation.skipped().count(),
        duration_ms = evaluate_start.elapsed().as_millis(),
        "evaluate complete"
    );

    let aggregate_start = Instant::now();
    let (facilities, groups) = info_span!("aggregate")
        .in_scope(|| -> Result<_> {
            let facilities = aggregate(&table, spec.keys, &evaluation)?;
            let groups = partition(&facilities, config.layout)?;
            Ok((facilities, groups))
        })
        .context("aggregate cohorts per facility")?;
    info!(
        facilities = facilities.height(),
        groups = groups.len(),
        duration_ms = aggregate_start.elapsed().as_millis(),
        "aggregate complete"
    );

    let write_start = Instant::now();
    let outputs = info_span!("write", output_dir = %config.output_dir.display()).in_scope(
        || -> Result<_> {
            let mut outputs = write_report_groups(
                &config.output_dir,
                config.pipeline,
                &groups,
                config.format,
            )?;
            if config.write_audits {
                let audits = build_audits(&table, &spec.audits, &config.period)
                    .context("build audit tables")?;
                outputs.extend(write_audit_tables(
                    &config.output_dir,
                    config.pipeline,
                    &audits,
                    config.format,
                )?);
            }
            Ok(outputs)
        },
    )?;
    info!(
        files = outputs.len(),
        duration_ms = write_start.elapsed().as_millis(),
        "write complete"
    );

    Ok(RunSummary {
        pipeline: config.pipeline,
        period: config.period.clone(),
        layout: config.layout,
        format: config.format,
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        files: ingested.files,
        skipped_files: ingested.skipped,
        records: table.len(),
        facilities: facilities.height(),
        indicators: indicator_counts(&evaluation, &facilities)?,
        normalization,
        outputs,
    })
}

fn indicator_counts(
    evaluation: &Evaluation,
    facilities: &FacilityTable,
) -> Result<Vec<IndicatorCount>> {
    evaluation
        .cohorts()
        .iter()
        .map(|cohort| {
            Ok(IndicatorCount {
                name: cohort.indicator.clone(),
                records: cohort.count(),
                facilities: facilities.facilities_reporting(&cohort.indicator)?,
                status: cohort.status.clone(),
            })
        })
        .collect()
}

/// Raw samples are logged at debug level and kept in the summary only when
/// row-level logging is enabled.
fn redact_samples(report: &mut NormalizationReport) {
    for issue in &mut report.issues {
        issue.samples = issue
            .samples
            .iter()
            .map(|sample| redact_value(sample).to_string())
            .collect();
        debug!(
            column = %issue.column,
            kind = ?issue.kind,
            samples = ?issue.samples,
            "normalization samples"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_periods_are_calendar_quarters() {
        for pipeline in PipelineKind::ALL {
            let period = default_period(pipeline).unwrap();
            assert!(check_quarter_alignment(pipeline, &period), "{pipeline}");
        }
        let index = default_period(PipelineKind::HtsIndex).unwrap();
        assert_eq!(index.start(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn misaligned_period_is_reported_not_rejected() {
        let period = ReportingPeriod::new(
            NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap();
        assert!(!check_quarter_alignment(PipelineKind::Radet, &period));
    }
}
