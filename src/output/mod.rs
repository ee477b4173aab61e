mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::export_report;
pub use progress::BuildProgress;
pub use styling::{bright_yellow, dim, magenta_bold};
pub use summary::print_summary;

/// Prints the timesheet banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⏱️ Timesheet"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab activity to daily timesheets")
    );
}
