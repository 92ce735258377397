use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use crate::build::{BuildRecord, BuildStatus};

/// Table of the current build records of a phase.
pub fn build_table(records: &[BuildRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Job", "Build", "Status", "Stage", "Duration (s)"]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.job_name),
            Cell::new(format!("#{}", record.build_number)),
            status_cell(&record.status),
            Cell::new(&record.stage),
            Cell::new(format!("{:.1}", record.duration)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

fn status_cell(status: &BuildStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        BuildStatus::Success => cell.fg(TableColor::Green),
        BuildStatus::Failed | BuildStatus::Aborted => cell.fg(TableColor::Red),
        BuildStatus::Initiated => cell.fg(TableColor::DarkGrey),
        _ => cell.fg(TableColor::Yellow),
    }
}
