use log::debug;

use super::types::Event;
use super::window::ReportWindow;
use crate::error::{Result, TimesheetError};

/// Branches whose pushes are integration work rather than a task.
pub const DEFAULT_EXCLUDED_BRANCHES: [&str; 3] = ["main", "master", "develop"];

fn non_empty(events: Vec<Event>, stage: &str) -> Result<Vec<Event>> {
    if events.is_empty() {
        debug!("No events left after the {stage} filter");
        return Err(TimesheetError::NoActivity);
    }

    debug!("{} events left after the {stage} filter", events.len());
    Ok(events)
}

/// Keeps events created strictly inside the report window.
pub fn filter_by_time(events: Vec<Event>, window: &ReportWindow) -> Result<Vec<Event>> {
    let kept = events
        .into_iter()
        .filter(|event| window.contains(event.created_at))
        .collect();

    non_empty(kept, "time")
}

/// Drops pushes to excluded branches. Events without a push ref always pass.
pub fn filter_by_branches(events: Vec<Event>, excluded: &[String]) -> Result<Vec<Event>> {
    let kept = events
        .into_iter()
        .filter(|event| match event.push_ref() {
            Some(branch) => !excluded.iter().any(|name| name == branch),
            None => true,
        })
        .collect();

    non_empty(kept, "branch")
}

/// Keeps only tracked actions: branch creation, pushes, opened and accepted merge requests.
pub fn filter_by_actions(events: Vec<Event>) -> Result<Vec<Event>> {
    let kept = events
        .into_iter()
        .filter(|event| event.tracked_action().is_some())
        .collect();

    non_empty(kept, "action")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gitlab::fixtures::{at, commit, hours, merge_request_event, push};
    use chrono::{FixedOffset, NaiveDate};

    fn window() -> ReportWindow {
        ReportWindow::for_day(
            NaiveDate::from_ymd_opt(2023, 10, 5).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    fn excluded() -> Vec<String> {
        DEFAULT_EXCLUDED_BRANCHES.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_time_filter_is_exclusive_on_both_ends() {
        let window = window();
        let events = vec![
            commit("feature/a", "a1", window.start),
            commit("feature/a", "a2", at(10, 0)),
            commit("feature/a", "a3", window.end),
            commit("feature/a", "a4", window.start - hours(3)),
        ];

        let kept = filter_by_time(events, &window).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].commit_to(), Some("a2"));
    }

    #[test]
    fn test_time_filter_with_nothing_inside_is_no_activity() {
        let window = window();
        let events = vec![
            commit("feature/a", "a1", window.start - hours(1)),
            commit("feature/a", "a2", window.start - hours(5)),
        ];

        let err = filter_by_time(events, &window).unwrap_err();
        assert!(err.is_no_activity());
    }

    #[test]
    fn test_branch_filter_drops_excluded_branches_only() {
        let events = vec![
            commit("main", "m1", at(9, 0)),
            commit("develop", "d1", at(9, 30)),
            commit("feature/a", "a1", at(10, 0)),
            merge_request_event("accepted", 3, at(11, 0)),
        ];

        let kept = filter_by_branches(events, &excluded()).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].push_ref(), Some("feature/a"));
        assert!(kept[1].targets_merge_request());
    }

    #[test]
    fn test_branch_filter_honours_custom_exclusions() {
        let events = vec![
            commit("main", "m1", at(9, 0)),
            commit("release", "r1", at(10, 0)),
        ];

        let kept = filter_by_branches(events, &["release".to_string()]).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].push_ref(), Some("main"));
    }

    #[test]
    fn test_branch_filter_on_only_mainline_pushes_is_no_activity() {
        let events = vec![
            commit("main", "m1", at(9, 0)),
            commit("master", "m2", at(10, 0)),
        ];

        let err = filter_by_branches(events, &excluded()).unwrap_err();
        assert!(err.is_no_activity());
    }

    #[test]
    fn test_action_filter_keeps_tracked_actions() {
        let events = vec![
            push("pushed new", "feature/a", "a0", at(9, 0)),
            commit("feature/a", "a1", at(9, 30)),
            merge_request_event("opened", 3, at(10, 0)),
            merge_request_event("accepted", 3, at(11, 0)),
            merge_request_event("commented on", 3, at(12, 0)),
            push("deleted", "feature/a", "a2", at(13, 0)),
        ];

        let kept = filter_by_actions(events).unwrap();
        let actions: Vec<_> = kept.iter().map(|e| e.action_name.as_str()).collect();
        assert_eq!(actions, vec!["pushed new", "pushed to", "opened", "accepted"]);
    }

    #[test]
    fn test_action_filter_without_tracked_actions_is_no_activity() {
        let events = vec![merge_request_event("commented on", 3, at(12, 0))];

        let err = filter_by_actions(events).unwrap_err();
        assert!(err.is_no_activity());
    }

    #[test]
    fn test_filters_are_idempotent() {
        let window = window();
        let events = vec![
            commit("feature/a", "a1", at(9, 0)),
            commit("main", "m1", at(10, 0)),
            merge_request_event("commented on", 3, at(11, 0)),
        ];

        let once = filter_by_actions(
            filter_by_branches(filter_by_time(events, &window).unwrap(), &excluded()).unwrap(),
        )
        .unwrap();
        let twice = filter_by_actions(
            filter_by_branches(filter_by_time(once.clone(), &window).unwrap(), &excluded())
                .unwrap(),
        )
        .unwrap();

        assert_eq!(once.len(), 1);
        assert_eq!(twice.len(), once.len());
        assert_eq!(twice[0].commit_to(), once[0].commit_to());
    }
}
