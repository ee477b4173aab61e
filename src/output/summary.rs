use std::fmt::Write;

use chrono::FixedOffset;
use comfy_table::Cell;

use crate::providers::gitlab::LINK_SEPARATOR;
use crate::report::Report;

use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{color_coded_hours_cell, create_table, cyan_header};

/// Prints a human-readable timesheet to stdout.
///
/// Displays:
/// - Overview: report owner, day, number of tasks and total hours
/// - Tasks: one row per task with its start time in the user's offset, the
///   task reference, its links and the credited hours
///
/// Total hours are green up to a full workday and red beyond it.
pub fn print_summary(report: &Report, offset: FixedOffset, workday_hours: f64) {
    println!("{}", render_summary(report, offset, workday_hours));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn render_summary(report: &Report, offset: FixedOffset, workday_hours: f64) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let total = report.total_hours();
    let total_display = if total > workday_hours {
        bright_red(format!("{total:.2}h"))
    } else {
        bright_green(format!("{total:.2}h"))
    };

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("User:"),
        cyan(report.user_id),
        dim("Date:"),
        cyan(report.date),
        dim("Tasks:"),
        bright_yellow(report.rows.len()),
        dim("Total hours:"),
        total_display,
    );

    add_section_header(&mut output, "🗂️", "Tasks");

    let mut table = create_table();
    table.set_header(cyan_header(&["Started", "Task", "Links", "Hours"]));

    for row in &report.rows {
        let started = row.date.with_timezone(&offset).format("%H:%M").to_string();
        table.add_row(vec![
            Cell::new(started),
            Cell::new(&row.task),
            Cell::new(row.link.replace(LINK_SEPARATOR, "\n")),
            color_coded_hours_cell(f64::from(row.time_spent), workday_hours),
        ]);
    }

    let _ = writeln!(output, "{table}");

    output
}
