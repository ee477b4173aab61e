use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_red, bright_yellow};

/// Spinner shown while a report build runs
pub struct BuildProgress {
    pb: ProgressBar,
}

impl BuildProgress {
    pub fn start(date: NaiveDate) -> Self {
        let pb = create_spinner(bright_yellow(format!("Building timesheet for {date}")).to_string());
        Self { pb }
    }

    pub fn finish(self, rows: usize) {
        self.pb.finish_with_message(
            bright_green(format!("Timesheet built with {rows} tasks ✓")).to_string(),
        );
        eprintln!();
    }

    pub fn finish_empty(self) {
        self.pb
            .finish_with_message(bright_yellow("No tracked activity found").to_string());
        eprintln!();
    }

    pub fn fail(self) {
        self.pb
            .abandon_with_message(bright_red("Timesheet build failed ✗").to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
