use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::a1::CellRef;

// ── Ids ──────────────────────────────────────────────────────────

/// Every record is identified by the address of the cell it was read from.
macro_rules! cell_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub CellRef);

        impl $name {
            /// Numeric suffix of the A1 address, used for tie-breaking.
            pub fn number(&self) -> usize {
                self.0.row_number()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

cell_id!(TypeId);
cell_id!(SpaceId);
cell_id!(EventId);

// ── Registry records ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventType {
    pub id: TypeId,
    pub name: String,
    /// Single-letter code printed in front of event names.
    pub code: String,
}

impl EventType {
    pub fn new(id: TypeId, name: impl Into<String>) -> Self {
        let name = name.into();
        let code = name.chars().next().map(String::from).unwrap_or_default();
        Self { id, name, code }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    pub id: SpaceId,
    pub location: String,
    pub name: String,
}

// ── Time windows ─────────────────────────────────────────────────

/// Start of a whole-day window.
pub const DAY_BEGIN: NaiveTime = NaiveTime::MIN;

/// End of a whole-day window (23:59, as printed on the sheet).
pub fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// Time-of-day window on a naive clock, `begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub begin: NaiveTime,
    pub end: NaiveTime,
}

impl Window {
    pub fn new(begin: NaiveTime, end: NaiveTime) -> Self {
        debug_assert!(begin <= end, "Window begin must not be after end");
        Self { begin, end }
    }

    pub fn whole_day() -> Self {
        Self::new(DAY_BEGIN, day_end())
    }

    /// Conflict test used by the detector: `begin < other.end || end > other.begin`.
    ///
    /// This is a disjunction, not the usual interval intersection, so any two
    /// windows conflict unless both collapse onto the same instant.
    pub fn conflicts_with(&self, other: &Window) -> bool {
        self.begin < other.end || self.end > other.begin
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin.format("%H:%M"), self.end.format("%H:%M"))
    }
}

// ── Events ───────────────────────────────────────────────────────

/// One calendar-day occurrence of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTime {
    pub date: NaiveDate,
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub event_type: EventType,
    /// Non-empty; the first space's location is where the event is rendered.
    pub spaces: Vec<Space>,
    pub times: Vec<EventTime>,
    pub owner: Option<String>,
    pub whole_day: bool,
}

impl Event {
    pub fn location(&self) -> &str {
        self.spaces.first().map_or("", |s| s.location.as_str())
    }
}
