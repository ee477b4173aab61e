use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::auth::Token;
use crate::error::{Result, TimesheetError};

/// Offsets beyond half a day only produce a warning.
const SUSPICIOUS_OFFSET_MINUTES: i32 = 12 * 60;

/// The person a timesheet is built for.
#[derive(Debug, Clone)]
pub struct User {
    /// Owner id stamped on the report
    pub id: i64,
    /// GitLab user id whose events are read
    pub gitlab_id: u64,
    pub token: Token,
    /// Minutes east of UTC
    pub timezone_offset: i32,
}

impl User {
    /// Returns the user's fixed UTC offset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the offset is a full day or more.
    pub fn offset(&self) -> Result<FixedOffset> {
        if self.timezone_offset.abs() > SUSPICIOUS_OFFSET_MINUTES {
            warn!(
                "Timezone offset {} minutes is larger than half a day",
                self.timezone_offset
            );
        }

        FixedOffset::east_opt(self.timezone_offset * 60).ok_or_else(|| {
            TimesheetError::Config(format!(
                "timezone offset {} minutes is out of range",
                self.timezone_offset
            ))
        })
    }
}

/// One task line of a timesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Assigned by persistence; always zero when built
    #[serde(rename = "rowReportId")]
    pub report_id: i64,
    pub date: DateTime<Utc>,
    pub task: String,
    pub link: String,
    #[serde(rename = "timeSpent")]
    pub time_spent: f32,
}

/// A one-day timesheet for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "reportUserId")]
    pub user_id: i64,
    #[serde(rename = "reportDate")]
    pub date: NaiveDate,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn total_hours(&self) -> f64 {
        self.rows.iter().map(|row| f64::from(row.time_spent)).sum()
    }
}
