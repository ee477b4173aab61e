use anyhow::{bail, Result};
use std::io::Write;

use crate::config::OutputFormat;
use crate::report::Report;

/// Exports a report in a machine-readable format.
///
/// - JSON: the report with its camelCase field names, for other tools
/// - CSV: one line per task, for spreadsheets
///
/// The summary format is terminal output and is rendered by [`super::print_summary`].
pub fn export_report(
    report: &Report,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => export_json(report, pretty, output),
        OutputFormat::Csv => export_csv(report, output),
        OutputFormat::Summary => bail!("Summary output can only be printed to the terminal"),
    }
}

fn export_json(report: &Report, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn export_csv(report: &Report, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "User,Date,Started,Task,Links,Hours")?;

    for row in &report.rows {
        writeln!(
            output,
            "{},{},{},{},{},{:.2}",
            report.user_id,
            report.date,
            row.date.to_rfc3339(),
            csv_field(&row.task),
            csv_field(&row.link),
            row.time_spent
        )?;
    }

    Ok(())
}
