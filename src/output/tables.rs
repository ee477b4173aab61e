use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Hours cell: yellow for tasks credited nothing, red past a full workday.
pub fn color_coded_hours_cell(hours: f64, workday_hours: f64) -> Cell {
    let text = format!("{hours:.2}h");
    if hours <= 0.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else if hours > workday_hours {
        Cell::new(text).fg(TableColor::Red)
    } else {
        Cell::new(text).fg(TableColor::Green)
    }
}
