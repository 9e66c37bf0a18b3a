use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::model::*;

use super::{Schedule, ScheduleIndex};

/// Order a bucket by type id suffix descending, then event id suffix descending.
/// The sort is stable, so repeated calls leave the bucket unchanged.
pub fn sort_bucket(bucket: &mut [Schedule<'_>]) {
    bucket.sort_by_key(|s| Reverse((s.event.event_type.id.number(), s.event.id.number())));
}

/// Pairwise conflicts within one (date, space) bucket.
///
/// Sorts the bucket in tie-break order, then for every pair `i < j` whose
/// windows conflict records `j` under `i`. The map is one-directional: an event
/// only appears as a key when it sorts before the other member of a pair.
pub fn conflicts(bucket: &mut [Schedule<'_>]) -> BTreeMap<EventId, Vec<EventId>> {
    sort_bucket(bucket);
    let mut result: BTreeMap<EventId, Vec<EventId>> = BTreeMap::new();
    for lo in 0..bucket.len() {
        for hi in lo + 1..bucket.len() {
            if bucket[lo].window.conflicts_with(&bucket[hi].window) {
                result
                    .entry(bucket[lo].event_id())
                    .or_default()
                    .push(bucket[hi].event_id());
            }
        }
    }
    result
}

/// Per-date set of events that conflict with at least one other event in any
/// space they occupy that day.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConflictSet {
    by_date: BTreeMap<NaiveDate, BTreeSet<EventId>>,
}

impl ConflictSet {
    /// Run conflict detection over every bucket of the index, leaving each bucket
    /// in tie-break order. Both members of a conflicting pair are flagged.
    pub fn detect(index: &mut ScheduleIndex<'_>) -> Self {
        let mut set = Self::default();
        let mut pairs = 0u64;
        for (date, space, bucket) in index.buckets_mut() {
            let adjacency = conflicts(bucket);
            if adjacency.is_empty() {
                continue;
            }
            debug!("conflicts on {date} in {space}: {adjacency:?}");
            let flagged = set.by_date.entry(date).or_default();
            for (event, others) in adjacency {
                pairs += others.len() as u64;
                flagged.insert(event);
                flagged.extend(others);
            }
        }
        metrics::counter!(crate::observability::CONFLICT_PAIRS_TOTAL).increment(pairs);
        set
    }

    pub fn has_conflict(&self, date: NaiveDate, event: EventId) -> bool {
        self.by_date
            .get(&date)
            .is_some_and(|events| events.contains(&event))
    }

    /// Events flagged on `date`, in id order.
    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = EventId> + '_ {
        self.by_date.get(&date).into_iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
