use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use super::allocation::Allocation;
use super::grouping::Bucket;
use super::links::{commit_base_url, commit_links, merge_request_links, LINK_SEPARATOR};
use super::source::EventSource;
use crate::auth::Token;
use crate::error::{Result, TimesheetError};
use crate::report::ReportRow;

pub const DEFAULT_LINK_PLACEHOLDER: &str = "Failed to get commits";

/// Turns task buckets into report rows.
pub struct RowBuilder<'a> {
    source: &'a dyn EventSource,
    token: &'a Token,
    placeholder: &'a str,
}

impl<'a> RowBuilder<'a> {
    pub fn new(source: &'a dyn EventSource, token: &'a Token, placeholder: &'a str) -> Self {
        Self {
            source,
            token,
            placeholder,
        }
    }

    /// Looks up one commit of the bucket to learn the project's commit URL prefix.
    ///
    /// Returns `Ok(None)` when the bucket has no commit to link.
    async fn commit_base(
        &self,
        bucket: &Bucket,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let Some((project_id, sha)) = bucket
            .commit_events()
            .find_map(|event| event.commit_to().map(|sha| (event.project_id, sha)))
        else {
            return Ok(None);
        };

        if cancel.is_cancelled() {
            return Err(TimesheetError::Cancelled);
        }

        let commit = self
            .source
            .fetch_commit(project_id, sha, self.token)
            .await
            .map_err(|e| TimesheetError::upstream(format!("commit {sha}"), e))?;

        Ok(Some(commit_base_url(&commit.web_url).to_string()))
    }

    /// Builds the row for one task from its already folded `allocation`.
    ///
    /// A failed commit lookup does not fail the row: its link cell becomes the
    /// placeholder text instead.
    ///
    /// # Errors
    ///
    /// Only cancellation is reported as an error.
    pub async fn build_row(
        &self,
        task_key: &str,
        bucket: &Bucket,
        allocation: &Allocation,
        cancel: &CancellationToken,
    ) -> Result<ReportRow> {
        debug!("Building row for: {task_key}");

        let (task, mut links) = match bucket.merge_request() {
            Some(mr) => (mr.issue_ref().to_string(), merge_request_links(bucket)),
            None => (task_key.to_string(), Vec::new()),
        };

        let link = match self.commit_base(bucket, cancel).await {
            Ok(Some(base_url)) => {
                links.extend(commit_links(bucket, &base_url));
                links.join(LINK_SEPARATOR)
            }
            Ok(None) => links.join(LINK_SEPARATOR),
            Err(TimesheetError::Cancelled) => return Err(TimesheetError::Cancelled),
            Err(e) => {
                warn!("Could not resolve commit links for {task_key}: {e}");
                self.placeholder.to_string()
            }
        };

        #[allow(clippy::cast_possible_truncation)]
        let time_spent = allocation.hours as f32;

        Ok(ReportRow {
            report_id: 0,
            date: bucket.first_at(),
            task,
            link,
            time_spent,
        })
    }
}
