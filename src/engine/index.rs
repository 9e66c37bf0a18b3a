use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::*;

/// One event occupying one space on one date.
#[derive(Debug, Clone, Copy)]
pub struct Schedule<'a> {
    pub event: &'a Event,
    pub window: Window,
}

impl Schedule<'_> {
    pub fn event_id(&self) -> EventId {
        self.event.id
    }
}

/// Schedules bucketed by (date, space). Built once from a freshly loaded
/// catalog; buckets iterate by date, then by space id.
#[derive(Debug, Default)]
pub struct ScheduleIndex<'a> {
    buckets: BTreeMap<NaiveDate, BTreeMap<SpaceId, Vec<Schedule<'a>>>>,
    schedules: usize,
}

impl<'a> ScheduleIndex<'a> {
    /// One schedule per (event time × space) of every event.
    pub fn build(events: &'a [Event]) -> Self {
        let mut index = Self::default();
        for event in events {
            for time in &event.times {
                let by_space = index.buckets.entry(time.date).or_default();
                for space in &event.spaces {
                    by_space.entry(space.id).or_default().push(Schedule {
                        event,
                        window: time.window,
                    });
                    index.schedules += 1;
                }
            }
        }
        metrics::gauge!(crate::observability::SCHEDULES_INDEXED).set(index.schedules as f64);
        index
    }

    pub fn bucket(&self, date: NaiveDate, space: SpaceId) -> &[Schedule<'a>] {
        self.buckets
            .get(&date)
            .and_then(|by_space| by_space.get(&space))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (NaiveDate, SpaceId, &[Schedule<'a>])> {
        self.buckets.iter().flat_map(|(date, by_space)| {
            by_space
                .iter()
                .map(move |(space, schedules)| (*date, *space, schedules.as_slice()))
        })
    }

    pub(crate) fn buckets_mut(
        &mut self,
    ) -> impl Iterator<Item = (NaiveDate, SpaceId, &mut Vec<Schedule<'a>>)> {
        self.buckets.iter_mut().flat_map(|(date, by_space)| {
            by_space
                .iter_mut()
                .map(move |(space, schedules)| (*date, *space, schedules))
        })
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.keys().copied()
    }

    /// Total number of schedules across all buckets.
    pub fn len(&self) -> usize {
        self.schedules
    }

    pub fn is_empty(&self) -> bool {
        self.schedules == 0
    }
}
