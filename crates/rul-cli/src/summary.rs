use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use rul_cli::pipeline::FitReport;

pub fn print_fit_summary(report: &FitReport) {
    println!("Dataset: {}", report.dataset_dir.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Lives"), Cell::new(report.lives)]);
    table.add_row(vec![Cell::new("Lives fitted"), Cell::new(report.fitted_lives)]);
    table.add_row(vec![Cell::new("Rows fitted"), Cell::new(report.rows)]);
    table.add_row(vec![
        Cell::new("Output features").add_attribute(Attribute::Bold),
        Cell::new(report.n_features).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_feature_table(&report.features);
}

fn print_feature_table(features: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Surviving feature")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    if features.is_empty() {
        table.add_row(vec![dim_cell("-"), dim_cell("no feature survived selection")]);
    }
    for (idx, name) in features.iter().enumerate() {
        table.add_row(vec![Cell::new(idx), Cell::new(name)]);
    }
    println!("{table}");
}

pub fn print_export_summary(report: &FitReport, written: &[PathBuf]) {
    print_fit_summary(report);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Life"), header_cell("Output")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (idx, path) in written.iter().enumerate() {
        table.add_row(vec![Cell::new(idx), Cell::new(path.display())]);
    }
    println!("{table}");
}

pub fn print_segments(lengths: &[usize]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Life"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for (idx, len) in lengths.iter().enumerate() {
        table.add_row(vec![Cell::new(idx), Cell::new(len)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(lengths.iter().sum::<usize>()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
