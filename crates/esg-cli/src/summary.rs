use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use esg_model::format_numeric;
use esg_transform::NumericSummary;

use esg_cli::types::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!("Pipeline: {}", summary.pipeline);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Name"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Detail"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for input in &summary.inputs {
        table.add_row(vec![
            Cell::new("input").fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(file_name(&input.path)),
            Cell::new(input.rows),
            Cell::new(input.columns),
            dim_cell(&input.detail),
        ]);
    }
    for output in &summary.outputs {
        let rows = if output.truncated {
            Cell::new(output.rows).fg(Color::Yellow).add_attribute(Attribute::Bold)
        } else {
            Cell::new(output.rows)
        };
        let detail = if output.sanitized_cells > 0 {
            Cell::new(format!(
                "{} bytes, {} cell(s) cleaned",
                output.bytes, output.sanitized_cells
            ))
        } else {
            dim_cell(format!("{} bytes", output.bytes))
        };
        table.add_row(vec![
            Cell::new("output").fg(Color::Green).add_attribute(Attribute::Bold),
            Cell::new(file_name(&output.path)),
            rows,
            Cell::new(output.columns),
            detail,
        ]);
    }
    println!("{table}");
    if let Some(evolution) = &summary.evolution {
        print_evolution(evolution);
    }
    if !summary.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &summary.warnings {
            eprintln!("- {warning}");
        }
    }
}

fn print_evolution(evolution: &NumericSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Valid values"),
        header_cell("Mean"),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(evolution.count),
        stat_cell(evolution.mean),
        stat_cell(evolution.min),
        stat_cell(evolution.max),
    ]);
    println!();
    println!("Evolution of employment in France:");
    println!("{table}");
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

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn stat_cell(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(format_numeric(v)),
        None => dim_cell("-"),
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
