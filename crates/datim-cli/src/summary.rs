use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use datim_core::CohortStatus;
use datim_cli::types::{IndicatorCount, OutputKind, RunSummary};

pub fn print_summary(summary: &RunSummary) {
    println!("Pipeline: {}", summary.pipeline);
    println!(
        "Period: {} to {}",
        summary.period.start(),
        summary.period.end()
    );
    println!(
        "Input: {} ({} files, {} records, {} facilities)",
        summary.input_dir.display(),
        summary.files.len(),
        summary.records,
        summary.facilities
    );
    println!("Output: {}", summary.output_dir.display());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Indicator"),
        header_cell("Records"),
        header_cell("Facilities"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    let mut reporting = 0usize;
    for count in &summary.indicators {
        if count.records > 0 {
            reporting += 1;
        }
        table.add_row(vec![
            Cell::new(&count.name),
            count_cell(count.records),
            count_cell(count.facilities),
            status_cell(count),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{reporting}/{} non-zero", summary.indicators.len()))
            .add_attribute(Attribute::Bold),
        Cell::new(summary.facilities).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_outputs(summary);
    print_warnings(summary);
}

fn print_outputs(summary: &RunSummary) {
    if summary.outputs.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("Rows"), header_cell("File")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for output in &summary.outputs {
        let kind = match output.kind {
            OutputKind::Report => Cell::new("report").fg(Color::Green),
            OutputKind::Audit => dim_cell("audit"),
        };
        table.add_row(vec![
            kind,
            Cell::new(output.rows),
            Cell::new(output.path.display()),
        ]);
    }
    println!();
    println!("{table}");
}

fn print_warnings(summary: &RunSummary) {
    let mut warnings = Vec::new();
    for skipped in &summary.skipped_files {
        warnings.push(format!("{} skipped: {}", skipped.path.display(), skipped.reason));
    }
    for file in summary.files.iter().filter(|f| f.skipped_rows > 0) {
        warnings.push(format!(
            "{}: {} malformed rows dropped",
            file.path.display(),
            file.skipped_rows
        ));
    }
    for issue in &summary.normalization.issues {
        warnings.push(format!(
            "{}: {} values normalized to missing ({:?})",
            issue.column, issue.count, issue.kind
        ));
    }
    if !summary.normalization.missing_columns.is_empty() {
        warnings.push(format!(
            "columns absent from the extract: {}",
            summary.normalization.missing_columns.join(", ")
        ));
    }
    if warnings.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("Warnings:");
    for warning in warnings {
        eprintln!("- {warning}");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(count: &IndicatorCount) -> Cell {
    match &count.status {
        CohortStatus::Evaluated => Cell::new("ok").fg(Color::Green),
        CohortStatus::Skipped { missing } => {
            Cell::new(format!("skipped: missing {}", missing.join(", "))).fg(Color::Yellow)
        }
    }
}

fn count_cell(value: usize) -> Cell {
    if value > 0 {
        Cell::new(value)
    } else {
        dim_cell(value)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
