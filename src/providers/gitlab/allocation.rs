//! Estimates hours per task from point-in-time activity.
//!
//! Tasks are assumed to be worked on one after another. Buckets are processed
//! in chronological order and each one hands its last event time to the next
//! as `prev_end`. A bucket is credited the steps between its own events; only
//! the first bucket of the day is also credited the lead-in from the initial
//! anchor, so idle time between tasks is never reported as work.

use chrono::{DateTime, Duration, Utc};

use super::grouping::{Bucket, Buckets};

pub const DEFAULT_WORKDAY_HOURS: f64 = 8.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Result of allocating one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub hours: f64,
    /// Anchor for the next bucket: this bucket's last event
    pub prev_end: DateTime<Utc>,
}

#[allow(clippy::cast_precision_loss)]
fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

#[allow(clippy::cast_possible_truncation)]
pub fn workday(hours: f64) -> Duration {
    Duration::milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
}

/// Picks the anchor for the first bucket of the day.
///
/// A report with a single bucket that is one self-contained deliverable
/// (a merge request, or exactly one push) is credited a full workday ending at
/// its first event. A single bucket with several pushes is measured by its own
/// span. With several buckets the anchor is the earliest filtered event.
pub fn init_prev_time(
    buckets: &Buckets,
    earliest: DateTime<Utc>,
    workday: Duration,
) -> DateTime<Utc> {
    if buckets.len() != 1 {
        return earliest;
    }

    let Some(bucket) = buckets.values().next() else {
        return earliest;
    };

    let full_workday = bucket.first_at() - workday;

    if bucket.merge_request().is_some() || bucket.commit_count() == 1 {
        return full_workday;
    }

    bucket.first_at()
}

/// Hours credited to `bucket` given the previous bucket's last event time.
///
/// - `prev_end` after the first event and before the last: the buckets overlap,
///   credit `last - prev_end`.
/// - `prev_end` after the first event and not before the last: zero.
/// - otherwise sum the strictly increasing steps between the bucket's events.
pub fn hours_spent(prev_end: DateTime<Utc>, bucket: &Bucket) -> f64 {
    let first = bucket.first_at();
    let last = bucket.last_at();

    if prev_end > first {
        if prev_end < last {
            return hours_between(prev_end, last);
        }
        return 0.0;
    }

    bucket
        .events()
        .windows(2)
        .filter(|pair| pair[0].created_at < pair[1].created_at)
        .map(|pair| hours_between(pair[0].created_at, pair[1].created_at))
        .sum()
}

/// Time from the day's initial anchor to the first bucket's first event.
pub fn lead_in_hours(anchor: DateTime<Utc>, bucket: &Bucket) -> f64 {
    let first = bucket.first_at();
    if anchor < first {
        hours_between(anchor, first)
    } else {
        0.0
    }
}

/// Allocates the first bucket of the day against the anchor from [`init_prev_time`].
pub fn allocate_first(anchor: DateTime<Utc>, bucket: &Bucket) -> Allocation {
    Allocation {
        hours: lead_in_hours(anchor, bucket) + hours_spent(anchor, bucket),
        prev_end: bucket.last_at(),
    }
}

/// One step of the sequential fold over the remaining ordered buckets.
pub fn allocate(prev_end: DateTime<Utc>, bucket: &Bucket) -> Allocation {
    Allocation {
        hours: hours_spent(prev_end, bucket),
        prev_end: bucket.last_at(),
    }
}
