use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Target type GitLab reports for merge request events.
pub const MERGE_REQUEST_TARGET: &str = "MergeRequest";

/// Activity kinds that count toward a timesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedAction {
    /// First push that creates a branch
    PushedNew,
    /// Push of commits to an existing branch
    PushedTo,
    /// Merge request opened
    Opened,
    /// Merge request accepted
    Accepted,
}

impl TrackedAction {
    pub fn from_name(action_name: &str) -> Option<Self> {
        match action_name {
            "pushed new" => Some(Self::PushedNew),
            "pushed to" => Some(Self::PushedTo),
            "opened" => Some(Self::Opened),
            "accepted" => Some(Self::Accepted),
            _ => None,
        }
    }

    pub fn is_commit(self) -> bool {
        matches!(self, Self::PushedNew | Self::PushedTo)
    }
}

/// A single entry of the GitLab user events feed.
///
/// Events are read-only once fetched; the only field filled in later is
/// `merge_request`, attached by the resolver for merge request events.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub project_id: u64,
    pub action_name: String,
    /// "MergeRequest", "Issue", ... or null for pushes
    #[serde(default)]
    pub target_type: Option<String>,
    /// Project-scoped id of the target (merge request iid for MR events)
    #[serde(default)]
    pub target_iid: Option<u64>,
    #[serde(default)]
    pub target_title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub push_data: Option<PushData>,
    #[serde(skip)]
    pub merge_request: Option<Arc<MergeRequest>>,
}

/// Push-specific payload of an event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushData {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    /// Previous head, null for a new branch
    #[serde(default)]
    pub commit_from: Option<String>,
    /// New head, null for a branch deletion
    #[serde(default)]
    pub commit_to: Option<String>,
    /// Branch name
    #[serde(default, rename = "ref")]
    pub ref_: Option<String>,
    #[serde(default)]
    pub commit_title: Option<String>,
}

impl Event {
    pub fn tracked_action(&self) -> Option<TrackedAction> {
        TrackedAction::from_name(&self.action_name)
    }

    pub fn is_commit(&self) -> bool {
        self.tracked_action().is_some_and(TrackedAction::is_commit)
    }

    pub fn targets_merge_request(&self) -> bool {
        self.target_type.as_deref() == Some(MERGE_REQUEST_TARGET)
    }

    /// Branch the push went to, if this is a push with a non-empty ref.
    pub fn push_ref(&self) -> Option<&str> {
        self.push_data
            .as_ref()
            .and_then(|data| data.ref_.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn commit_to(&self) -> Option<&str> {
        self.push_data
            .as_ref()
            .and_then(|data| data.commit_to.as_deref())
            .filter(|hash| !hash.is_empty())
    }

    /// Task identity: the merged branch for merge request activity, else the pushed branch.
    pub fn task_key(&self) -> &str {
        match &self.merge_request {
            Some(mr) => &mr.source_branch,
            None => self.push_ref().unwrap_or_default(),
        }
    }
}

/// Merge request details needed to name and link a task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
    pub web_url: String,
}

impl MergeRequest {
    /// The issue reference a task is reported under. Teams put the issue link in the title.
    pub fn issue_ref(&self) -> &str {
        &self.title
    }
}

/// A repository commit, only used for its canonical web URL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commit {
    pub id: String,
    pub web_url: String,
}
