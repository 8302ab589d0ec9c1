use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fitmerge_core::{CleanupReport, ImportReport, Inspection, MergeSummary, ProcessReport};
use fitmerge_model::{DetectionStrategy, SourceKind, SourceSpec};
use fitmerge_validate::{BatchReport, Issue, Severity, ValidationReport};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

pub fn print_sources(kinds: &[SourceKind]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Priority"),
        header_cell("Detection"),
        header_cell("Hz in/out"),
        header_cell("Required"),
        header_cell("Optional"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for kind in kinds {
        let spec = kind.spec();
        let name = if spec.is_base {
            Cell::new(format!("{} (base)", spec.name)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(spec.name)
        };
        table.add_row(vec![
            name,
            Cell::new(spec.priority),
            Cell::new(detection_label(spec)),
            Cell::new(format!("{} / {}", spec.input_hz, spec.output_hz)),
            Cell::new(column_list(spec.required.iter().map(|column| {
                if column.source == column.output {
                    column.source.to_string()
                } else {
                    format!("{} -> {}", column.source, column.output)
                }
            }))),
            Cell::new(column_list(
                spec.optional.iter().map(|column| column.output.to_string()),
            )),
        ]);
    }
    println!("{table}");
}

fn detection_label(spec: &SourceSpec) -> String {
    match spec.detection {
        DetectionStrategy::HeaderKeywords { keywords } => {
            format!("header has {}", keywords.join(", "))
        }
        DetectionStrategy::FileName {
            suffix,
            discriminator,
            discriminator_present,
            ..
        } => {
            let presence = if discriminator_present { "with" } else { "without" };
            format!("*{suffix} {presence} {discriminator}")
        }
    }
}

fn column_list(columns: impl Iterator<Item = String>) -> String {
    let list: Vec<String> = columns.collect();
    if list.is_empty() {
        "-".to_string()
    } else {
        list.join(", ")
    }
}

pub fn print_cleanup(report: &CleanupReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Directory"), header_cell("Archived")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (kind, count) in &report.archived {
        table.add_row(vec![Cell::new(kind), count_cell(*count, Color::Green)]);
    }
    table.add_row(vec![
        Cell::new("merged outputs"),
        count_cell(report.outputs_archived, Color::Green),
    ]);
    println!("{table}");
}

pub fn print_import(report: &ImportReport) {
    if report.imported.is_empty() && report.failed.is_empty() {
        println!("Nothing imported.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Source"), header_cell("File")]);
    apply_table_style(&mut table);
    for (kind, path) in &report.imported {
        table.add_row(vec![Cell::new(kind), Cell::new(file_name(path))]);
    }
    for (path, reason) in &report.failed {
        table.add_row(vec![
            Cell::new("failed").fg(Color::Red),
            Cell::new(format!("{}: {reason}", file_name(path))),
        ]);
    }
    println!("{table}");
    if !report.unrecognized.is_empty() {
        println!("{} file(s) not recognized", report.unrecognized.len());
    }
}

pub fn print_processing(reports: &[ProcessReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Clean tables"),
        header_cell("Skipped"),
        header_cell("Failed"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for report in reports {
        table.add_row(vec![
            Cell::new(report.kind),
            count_cell(report.produced.len(), Color::Green),
            count_cell(report.skipped.len(), Color::Yellow),
            count_cell(report.failed.len(), Color::Red),
        ]);
    }
    println!("{table}");
    for report in reports {
        for (path, reason) in &report.failed {
            eprintln!("- {}: {reason}", file_name(path));
        }
    }
}

pub fn print_batch(batch: &BatchReport) {
    if batch.reports.is_empty() {
        println!("No clean tables found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (path, report) in &batch.reports {
        table.add_row(vec![
            Cell::new(file_name(path)),
            status_cell(report),
            count_cell(report.errors.len(), Color::Red),
            count_cell(report.warnings.len(), Color::Yellow),
        ]);
    }
    println!("{table}");

    let issues: Vec<(String, Severity, &Issue)> = batch
        .reports
        .iter()
        .flat_map(|(path, report)| {
            report
                .issues()
                .map(move |(severity, issue)| (file_name(path), severity, issue))
        })
        .collect();
    print_issue_table(&issues);
}

pub fn print_merge(summary: &MergeSummary) {
    let outcome = &summary.outcome;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Columns")]);
    apply_table_style(&mut table);
    for (name, columns) in &outcome.contributed {
        table.add_row(vec![Cell::new(name), Cell::new(columns.join(", "))]);
    }
    for (name, columns) in &outcome.ignored {
        table.add_row(vec![
            dim_cell(name),
            dim_cell(format!("ignored: {}", columns.join(", "))),
        ]);
    }
    for name in &outcome.skipped {
        table.add_row(vec![dim_cell(name), dim_cell("skipped")]);
    }
    println!("{table}");

    if let Some(offset) = outcome.head_shift {
        println!("Data columns shifted up by {offset} row(s)");
    }
    if outcome.tail_trimmed > 0 {
        println!("Trimmed {} incomplete trailing row(s)", outcome.tail_trimmed);
    }
    println!(
        "Output: {} ({} rows, {} columns)",
        summary.output.display(),
        outcome.table.height(),
        outcome.table.width()
    );
    if let Some(report) = &summary.validation {
        println!("Output validation: {}", report.summary());
    }
}

pub fn print_inspection(inspection: &Inspection) {
    let kind = inspection
        .kind
        .map_or_else(|| "unrecognized".to_string(), |kind| kind.to_string());
    println!("File: {}", inspection.path.display());
    println!("Source: {kind}");
    println!(
        "Rows: {}, columns: {}",
        inspection.rows,
        inspection.columns.join(", ")
    );
    println!("Validation: {}", inspection.report.summary());
    let name = file_name(&inspection.path);
    let issues: Vec<(String, Severity, &Issue)> = inspection
        .report
        .issues()
        .map(|(severity, issue)| (name.clone(), severity, issue))
        .collect();
    print_issue_table(&issues);
}

fn print_issue_table(issues: &[(String, Severity, &Issue)]) {
    if issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Column"),
        header_cell("Row"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for (file, severity, issue) in issues {
        table.add_row(vec![
            Cell::new(file),
            severity_cell(*severity),
            Cell::new(issue.kind().label()),
            issue.column().map_or_else(|| dim_cell("-"), Cell::new),
            issue.row().map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(issue.message()),
        ]);
    }
    println!("{table}");
}

fn status_cell(report: &ValidationReport) -> Cell {
    if !report.is_valid() {
        Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold)
    } else if report.has_warnings() {
        Cell::new("warnings").fg(Color::Yellow)
    } else {
        Cell::new("passed").fg(Color::Green)
    }
}

fn severity_cell(severity: Severity) -> Cell {
    let color = match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };
    Cell::new(severity.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
