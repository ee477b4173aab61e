use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimesheetError {
    #[error("No tracked git activity in the report window")]
    NoActivity,

    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("API request failed with status {status} after {retries} retries")]
    ApiErrorAfterRetries { status: u16, retries: u32 },

    #[error("Failed to fetch {what}: {source}")]
    Upstream {
        what: String,
        #[source]
        source: Box<TimesheetError>,
    },

    #[error("Report build was cancelled")]
    Cancelled,

    #[error("Report build timed out after {0:?}")]
    Timeout(Duration),

    #[error("Report build ended without producing a result")]
    BuildAborted,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TimesheetError {
    /// Wraps a fetch failure with a description of what was being fetched.
    pub fn upstream(what: impl Into<String>, source: TimesheetError) -> Self {
        Self::Upstream {
            what: what.into(),
            source: Box::new(source),
        }
    }

    /// True for the expected "nothing to report" outcome.
    pub fn is_no_activity(&self) -> bool {
        matches!(self, Self::NoActivity)
    }
}

pub type Result<T> = std::result::Result<T, TimesheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_names_what_failed() {
        let err = TimesheetError::upstream(
            "merge request !7 in project 12",
            TimesheetError::ApiError {
                status: 404,
                message: "404 Not found".to_string(),
            },
        );

        assert_eq!(
            err.to_string(),
            "Failed to fetch merge request !7 in project 12: API request failed with status 404: 404 Not found"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_is_no_activity() {
        assert!(TimesheetError::NoActivity.is_no_activity());
        assert!(!TimesheetError::Cancelled.is_no_activity());
        assert!(!TimesheetError::upstream("events", TimesheetError::NoActivity).is_no_activity());
    }
}
