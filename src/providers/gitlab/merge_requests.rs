use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use super::source::EventSource;
use super::types::{Event, MergeRequest};
use crate::auth::Token;
use crate::error::{Result, TimesheetError};

/// Attaches merge request details to merge request events.
///
/// Owns the lookup cache for one build, so each merge request is fetched at
/// most once no matter how many events point at it. Keys are
/// `(project_id, iid)` because iids are only unique within a project.
pub struct MergeRequestResolver<'a> {
    source: &'a dyn EventSource,
    token: &'a Token,
    loaded: HashMap<(u64, u64), Arc<MergeRequest>>,
}

impl<'a> MergeRequestResolver<'a> {
    pub fn new(source: &'a dyn EventSource, token: &'a Token) -> Self {
        Self {
            source,
            token,
            loaded: HashMap::new(),
        }
    }

    /// Number of distinct merge requests fetched so far.
    pub fn fetched(&self) -> usize {
        self.loaded.len()
    }

    /// Resolves every merge request event in place.
    ///
    /// # Errors
    ///
    /// Any failed lookup aborts with an upstream error; `cancel` is checked
    /// before each remote fetch.
    pub async fn resolve(&mut self, events: &mut [Event], cancel: &CancellationToken) -> Result<()> {
        for event in events.iter_mut() {
            if !event.targets_merge_request() {
                continue;
            }

            let Some(iid) = event.target_iid else {
                warn!(
                    "Merge request event in project {} has no target iid, skipping",
                    event.project_id
                );
                continue;
            };

            let key = (event.project_id, iid);
            if let Some(mr) = self.loaded.get(&key) {
                debug!("Merge request !{iid} already loaded");
                event.merge_request = Some(Arc::clone(mr));
                continue;
            }

            if cancel.is_cancelled() {
                return Err(TimesheetError::Cancelled);
            }

            let mr = self
                .source
                .fetch_merge_request(event.project_id, iid, self.token)
                .await
                .map_err(|e| {
                    TimesheetError::upstream(
                        format!("merge request !{iid} in project {}", event.project_id),
                        e,
                    )
                })?;

            let mr = Arc::new(mr);
            self.loaded.insert(key, Arc::clone(&mr));
            event.merge_request = Some(mr);
        }

        Ok(())
    }
}
