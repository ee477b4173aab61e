use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::types::{Event, MergeRequest};

/// Events sharing one task identity. Never empty.
#[derive(Debug, Clone)]
pub struct Bucket {
    events: Vec<Event>,
}

impl Bucket {
    fn new(first: Event) -> Self {
        Self {
            events: vec![first],
        }
    }

    fn sort(&mut self) {
        sort_events(&mut self.events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn first_at(&self) -> DateTime<Utc> {
        self.events[0].created_at
    }

    pub fn last_at(&self) -> DateTime<Utc> {
        self.events[self.events.len() - 1].created_at
    }

    /// The first resolved merge request among the bucket's events.
    pub fn merge_request(&self) -> Option<&MergeRequest> {
        self.events.iter().find_map(|event| event.merge_request.as_deref())
    }

    /// Events that are not merge request activity, in bucket order.
    pub fn commit_events(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|event| event.merge_request.is_none())
    }

    /// Number of push actions ("pushed new" and "pushed to").
    pub fn commit_count(&self) -> usize {
        self.events.iter().filter(|event| event.is_commit()).count()
    }
}

/// Task buckets keyed by task key, in first-seen order.
pub type Buckets = IndexMap<String, Bucket>;

/// Stable chronological sort.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|event| event.created_at);
}

/// Partitions events by task key: the merge request's source branch when one is
/// attached, otherwise the pushed branch.
pub fn group_by_branches(events: Vec<Event>) -> Buckets {
    let mut buckets = Buckets::new();

    for event in events {
        let key = event.task_key().to_string();
        match buckets.get_mut(&key) {
            Some(bucket) => bucket.events.push(event),
            None => {
                buckets.insert(key, Bucket::new(event));
            }
        }
    }

    buckets
}

/// Sorts every bucket internally and returns task keys ordered by each bucket's
/// earliest event. Equal start times fall back to lexical key order.
pub fn sort_branches(buckets: &mut Buckets) -> Vec<String> {
    for bucket in buckets.values_mut() {
        bucket.sort();
    }

    let mut starts: Vec<(DateTime<Utc>, &String)> = buckets
        .iter()
        .map(|(key, bucket)| (bucket.first_at(), key))
        .collect();
    starts.sort();

    starts.into_iter().map(|(_, key)| key.clone()).collect()
}
