use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use erkas_report::format_km;

use erkas_cli::types::{RunResult, RunStatus};

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    if let Some(path) = &result.outputs.table {
        println!("National table: {}", path.display());
    }
    if let Some(path) = &result.outputs.dataset {
        println!("National dataset: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Region"),
        header_cell("Format"),
        header_cell("Interval [m]"),
        header_cell("Segments"),
        header_cell("Total [km]"),
        header_cell("Exempted [km]"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_segments = 0usize;
    let mut total_km = 0.0;
    let mut exempted_km = 0.0;
    for row in &result.regions {
        let summary = &row.summary;
        total_segments += row.segments;
        total_km += summary.total_km;
        exempted_km += summary.exempted_km;
        let interval = summary.interval.to_string();
        table.add_row(vec![
            Cell::new(&summary.region)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.source_kind.format_tag()),
            if interval.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(interval)
            },
            Cell::new(row.segments),
            Cell::new(format_km(summary.total_km)),
            Cell::new(format_km(summary.exempted_km)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} regions", result.regions.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_segments).add_attribute(Attribute::Bold),
        Cell::new(format_km(total_km)).add_attribute(Attribute::Bold),
        Cell::new(format_km(exempted_km)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_skipped_table(result);
    if result.status == RunStatus::Cancelled {
        eprintln!(
            "Cancelled: {} region(s) not processed.",
            result.not_processed
        );
    }
}

fn print_skipped_table(result: &RunResult) {
    if result.skipped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Region"),
        header_cell("Format"),
        header_cell("Category"),
        header_cell("File"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for skipped in &result.skipped {
        table.add_row(vec![
            Cell::new(&skipped.region).fg(Color::Yellow),
            Cell::new(skipped.source_kind.format_tag()),
            Cell::new(format!("{:?}", skipped.category)),
            dim_cell(skipped.source_file.display()),
            Cell::new(&skipped.reason),
        ]);
    }
    println!();
    println!("Skipped regions:");
    println!("{table}");
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
        .set_width(120);
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
