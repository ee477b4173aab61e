//! Event builders and an in-memory event source shared by the report builder tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::source::EventSource;
use super::types::{Commit, Event, MergeRequest, PushData};
use crate::auth::Token;
use crate::error::{Result, TimesheetError};

pub const PROJECT_ID: u64 = 7;

/// 2023-10-05 at the given UTC wall-clock time.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 5, hour, minute, 0).unwrap()
}

pub fn hours(value: i64) -> Duration {
    Duration::hours(value)
}

pub fn push(action: &str, branch: &str, hash: &str, created_at: DateTime<Utc>) -> Event {
    Event {
        project_id: PROJECT_ID,
        action_name: action.to_string(),
        target_type: None,
        target_iid: None,
        target_title: None,
        created_at,
        push_data: Some(PushData {
            action: Some("pushed".to_string()),
            ref_type: Some("branch".to_string()),
            commit_from: None,
            commit_to: Some(hash.to_string()),
            ref_: Some(branch.to_string()),
            commit_title: None,
        }),
        merge_request: None,
    }
}

pub fn commit(branch: &str, hash: &str, created_at: DateTime<Utc>) -> Event {
    push("pushed to", branch, hash, created_at)
}

pub fn merge_request_event(action: &str, iid: u64, created_at: DateTime<Utc>) -> Event {
    Event {
        project_id: PROJECT_ID,
        action_name: action.to_string(),
        target_type: Some("MergeRequest".to_string()),
        target_iid: Some(iid),
        target_title: Some(format!("https://tracker.example.com/TASK-{iid}")),
        created_at,
        push_data: None,
        merge_request: None,
    }
}

pub fn merge_request(iid: u64, source_branch: &str) -> MergeRequest {
    MergeRequest {
        id: 1000 + iid,
        iid,
        project_id: PROJECT_ID,
        title: format!("https://tracker.example.com/TASK-{iid}"),
        state: "merged".to_string(),
        source_branch: source_branch.to_string(),
        target_branch: "main".to_string(),
        web_url: format!("https://gitlab.example.com/group/app/-/merge_requests/{iid}"),
    }
}

/// A merge request event with its merge request already resolved.
pub fn resolved(action: &str, iid: u64, source_branch: &str, created_at: DateTime<Utc>) -> Event {
    let mut event = merge_request_event(action, iid, created_at);
    event.merge_request = Some(Arc::new(merge_request(iid, source_branch)));
    event
}

/// In-memory [`EventSource`] that counts remote lookups.
#[derive(Default)]
pub struct FakeSource {
    pub events: Vec<Event>,
    pub merge_requests: Vec<MergeRequest>,
    /// Commit web URLs are `<commit_base>/<sha>`; `None` makes commit lookups fail
    pub commit_base: Option<String>,
    pub fail_events: bool,
    pub event_calls: AtomicUsize,
    pub merge_request_calls: AtomicUsize,
    pub commit_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events,
            commit_base: Some("https://gitlab.example.com/group/app/-/commit".to_string()),
            ..Self::default()
        }
    }

    pub fn merge_request_calls(&self) -> usize {
        self.merge_request_calls.load(Ordering::SeqCst)
    }

    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }
}

fn not_found(what: &str) -> TimesheetError {
    TimesheetError::ApiError {
        status: 404,
        message: format!("404 {what} Not Found"),
    }
}

#[async_trait]
impl EventSource for FakeSource {
    async fn fetch_events(
        &self,
        _user_id: u64,
        _token: &Token,
        _after: NaiveDate,
        _before: NaiveDate,
    ) -> Result<Vec<Event>> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_events {
            return Err(TimesheetError::ApiErrorAfterRetries {
                status: 502,
                retries: 3,
            });
        }
        Ok(self.events.clone())
    }

    async fn fetch_merge_request(
        &self,
        project_id: u64,
        iid: u64,
        _token: &Token,
    ) -> Result<MergeRequest> {
        self.merge_request_calls.fetch_add(1, Ordering::SeqCst);
        self.merge_requests
            .iter()
            .find(|mr| mr.project_id == project_id && mr.iid == iid)
            .cloned()
            .ok_or_else(|| not_found("Merge Request"))
    }

    async fn fetch_commit(&self, _project_id: u64, sha: &str, _token: &Token) -> Result<Commit> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let base = self.commit_base.as_ref().ok_or_else(|| not_found("Commit"))?;
        Ok(Commit {
            id: sha.to_string(),
            web_url: format!("{base}/{sha}"),
        })
    }
}
