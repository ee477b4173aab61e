use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::allocation::{
    allocate, allocate_first, init_prev_time, workday, Allocation, DEFAULT_WORKDAY_HOURS,
};
use super::filters::{
    filter_by_actions, filter_by_branches, filter_by_time, DEFAULT_EXCLUDED_BRANCHES,
};
use super::grouping::{group_by_branches, sort_branches, sort_events, Bucket, Buckets};
use super::merge_requests::MergeRequestResolver;
use super::rows::{RowBuilder, DEFAULT_LINK_PLACEHOLDER};
use super::source::EventSource;
use super::window::ReportWindow;
use crate::error::{Result, TimesheetError};
use crate::report::{Report, User};

/// Knobs of the report heuristics.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Pushes to these branches are ignored
    pub excluded_branches: Vec<String>,
    /// Hours credited to a lone deliverable with nothing earlier to measure from
    pub workday_hours: f64,
    /// Link cell text when commit links cannot be resolved
    pub link_placeholder: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            excluded_branches: DEFAULT_EXCLUDED_BRANCHES
                .iter()
                .map(ToString::to_string)
                .collect(),
            workday_hours: DEFAULT_WORKDAY_HOURS,
            link_placeholder: DEFAULT_LINK_PLACEHOLDER.to_string(),
        }
    }
}

/// Builds one-day timesheets from a user's GitLab activity.
///
/// The builder itself is immutable and shared; every build owns its events,
/// merge request cache and buckets.
pub struct ReportBuilder {
    source: Arc<dyn EventSource>,
    options: BuildOptions,
}

impl ReportBuilder {
    pub fn new(source: Arc<dyn EventSource>, options: BuildOptions) -> Self {
        Self { source, options }
    }

    /// Builds the report for `user` over `window`.
    ///
    /// Pipeline: fetch events, filter by time, branch and action, resolve merge
    /// requests, group into task buckets, order buckets chronologically, then
    /// fold the time allocation over them and build one row per bucket.
    ///
    /// # Errors
    ///
    /// - [`TimesheetError::NoActivity`] if any filter leaves nothing
    /// - [`TimesheetError::Upstream`] if events or a merge request cannot be fetched
    /// - [`TimesheetError::Cancelled`] if `cancel` fires between remote calls
    pub async fn build(
        &self,
        user: &User,
        window: ReportWindow,
        cancel: &CancellationToken,
    ) -> Result<Report> {
        debug!(
            "Building report for user {} from {} to {}",
            user.id, window.start, window.end
        );

        if cancel.is_cancelled() {
            return Err(TimesheetError::Cancelled);
        }

        let (after, before) = window.fetch_bounds();
        let events = self
            .source
            .fetch_events(user.gitlab_id, &user.token, after, before)
            .await
            .map_err(|e| {
                TimesheetError::upstream(format!("events of GitLab user {}", user.gitlab_id), e)
            })?;

        debug!("Fetched {} events", events.len());

        if cancel.is_cancelled() {
            return Err(TimesheetError::Cancelled);
        }

        let events = filter_by_time(events, &window)?;
        let events = filter_by_branches(events, &self.options.excluded_branches)?;
        let mut events = filter_by_actions(events)?;

        let mut resolver = MergeRequestResolver::new(self.source.as_ref(), &user.token);
        resolver.resolve(&mut events, cancel).await?;
        debug!("Resolved {} merge requests", resolver.fetched());

        sort_events(&mut events);
        let Some(earliest) = events.first().map(|event| event.created_at) else {
            return Err(TimesheetError::NoActivity);
        };

        let mut buckets = group_by_branches(events);
        let ordered = sort_branches(&mut buckets);

        let initial = init_prev_time(&buckets, earliest, workday(self.options.workday_hours));
        let plan = allocation_plan(&ordered, &buckets, initial);

        let row_builder =
            RowBuilder::new(self.source.as_ref(), &user.token, &self.options.link_placeholder);

        // Link lookups are independent per row; the join keeps the plan's order
        let rows = futures::future::join_all(
            plan.iter().map(|(key, bucket, allocation)| {
                row_builder.build_row(key, bucket, allocation, cancel)
            }),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        let report = Report {
            user_id: user.id,
            date: window.date,
            rows,
        };

        info!(
            "Built report for user {} on {}: {} rows, {:.2}h",
            user.id,
            window.date,
            report.rows.len(),
            report.total_hours()
        );

        Ok(report)
    }

    /// Starts a build as its own task.
    ///
    /// Exactly one result, report or error, is sent on the returned channel.
    pub fn spawn(
        self: &Arc<Self>,
        user: User,
        window: ReportWindow,
        cancel: CancellationToken,
    ) -> oneshot::Receiver<Result<Report>> {
        let (respch, result) = oneshot::channel();
        let builder = Arc::clone(self);

        tokio::spawn(async move {
            let outcome = builder.build(&user, window, &cancel).await;
            if respch.send(outcome).is_err() {
                debug!("Report for user {} finished after its caller gave up", user.id);
            }
        });

        result
    }
}

/// Pairs every ordered bucket with its allocation.
///
/// The first bucket is measured from `initial`, every later one from the
/// previous bucket's last event, so this is a strictly sequential fold.
fn allocation_plan<'a>(
    ordered: &'a [String],
    buckets: &'a Buckets,
    initial: DateTime<Utc>,
) -> Vec<(&'a str, &'a Bucket, Allocation)> {
    let mut prev_end = initial;
    let mut plan: Vec<(&str, &Bucket, Allocation)> = Vec::with_capacity(ordered.len());

    for key in ordered {
        let Some(bucket) = buckets.get(key) else {
            continue;
        };

        let allocation = if plan.is_empty() {
            allocate_first(prev_end, bucket)
        } else {
            allocate(prev_end, bucket)
        };
        debug!("{key}: {:.2}h from {prev_end}", allocation.hours);

        prev_end = allocation.prev_end;
        plan.push((key.as_str(), bucket, allocation));
    }

    plan
}

/// Runs a build and waits for its result, racing it against `timeout` and `cancel`.
///
/// When the deadline wins, the build is asked to stop at its next remote call
/// and whatever it produces later is dropped.
pub async fn build_with_deadline(
    builder: &Arc<ReportBuilder>,
    user: User,
    window: ReportWindow,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Report> {
    let build_cancel = cancel.child_token();
    let result = builder.spawn(user, window, build_cancel.clone());

    tokio::select! {
        outcome = result => outcome.unwrap_or_else(|_| Err(TimesheetError::BuildAborted)),
        () = tokio::time::sleep(timeout) => {
            build_cancel.cancel();
            warn!("Report build timed out after {timeout:?}");
            Err(TimesheetError::Timeout(timeout))
        }
        () = cancel.cancelled() => Err(TimesheetError::Cancelled),
    }
}
