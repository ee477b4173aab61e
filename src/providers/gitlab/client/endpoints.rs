use chrono::NaiveDate;
use log::debug;
use serde::de::DeserializeOwned;

use super::core::GitLabClient;
use crate::auth::Token;
use crate::error::Result;
use crate::providers::gitlab::types::{Commit, Event, MergeRequest};

const NEXT_PAGE_HEADER: &str = "x-next-page";
const DATE_FORMAT: &str = "%Y-%m-%d";

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

fn next_page(response: &reqwest::Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

impl GitLabClient {
    /// Fetches every event of a user strictly between two dates, following pagination.
    pub async fn fetch_user_events(
        &self,
        user_id: u64,
        token: &Token,
        after: NaiveDate,
        before: NaiveDate,
    ) -> Result<Vec<Event>> {
        let mut all_events = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut url = self.endpoint(&format!("users/{user_id}/events"))?;
            url.query_pairs_mut()
                .append_pair("after", &after.format(DATE_FORMAT).to_string())
                .append_pair("before", &before.format(DATE_FORMAT).to_string())
                .append_pair("per_page", &self.options.per_page.to_string())
                .append_pair("page", &page.to_string());

            let response = self.get(url, token).await?;
            let next = next_page(&response);
            let events: Vec<Event> = decode(response).await?;

            debug!(
                "Fetched {} events for user {user_id} (page {page})",
                events.len()
            );

            let fetched_count = events.len();
            all_events.extend(events);

            match next {
                Some(next) if fetched_count > 0 && next > page => page = next,
                _ => break,
            }
        }

        Ok(all_events)
    }

    pub async fn fetch_merge_request(
        &self,
        project_id: u64,
        iid: u64,
        token: &Token,
    ) -> Result<MergeRequest> {
        let url = self.endpoint(&format!("projects/{project_id}/merge_requests/{iid}"))?;
        let response = self.get(url, token).await?;
        decode(response).await
    }

    pub async fn fetch_commit(&self, project_id: u64, sha: &str, token: &Token) -> Result<Commit> {
        let url = self.endpoint(&format!("projects/{project_id}/repository/commits/{sha}"))?;
        let response = self.get(url, token).await?;
        decode(response).await
    }
}
