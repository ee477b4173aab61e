use async_trait::async_trait;
use chrono::NaiveDate;

use super::client::GitLabClient;
use super::types::{Commit, Event, MergeRequest};
use crate::auth::Token;
use crate::error::Result;

/// Where report builds read their activity from.
///
/// Implementations must be safe to share between concurrent builds.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events of `user_id` created strictly after `after` and strictly before `before`.
    async fn fetch_events(
        &self,
        user_id: u64,
        token: &Token,
        after: NaiveDate,
        before: NaiveDate,
    ) -> Result<Vec<Event>>;

    async fn fetch_merge_request(
        &self,
        project_id: u64,
        iid: u64,
        token: &Token,
    ) -> Result<MergeRequest>;

    async fn fetch_commit(&self, project_id: u64, sha: &str, token: &Token) -> Result<Commit>;
}

#[async_trait]
impl EventSource for GitLabClient {
    async fn fetch_events(
        &self,
        user_id: u64,
        token: &Token,
        after: NaiveDate,
        before: NaiveDate,
    ) -> Result<Vec<Event>> {
        self.fetch_user_events(user_id, token, after, before).await
    }

    async fn fetch_merge_request(
        &self,
        project_id: u64,
        iid: u64,
        token: &Token,
    ) -> Result<MergeRequest> {
        GitLabClient::fetch_merge_request(self, project_id, iid, token).await
    }

    async fn fetch_commit(&self, project_id: u64, sha: &str, token: &Token) -> Result<Commit> {
        GitLabClient::fetch_commit(self, project_id, sha, token).await
    }
}
