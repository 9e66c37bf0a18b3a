use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::a1::CellRef;
use crate::engine::EngineError;
use crate::limits::*;
use crate::model::*;
use crate::registry::{SpaceRegistry, TypeRegistry};
use crate::table::{self, rows_until_blank};

// Column order of the events table.
const COL_NAME: usize = 0;
const COL_TYPE: usize = 1;
pub const COL_BEGIN_DATE: usize = 2;
const COL_END_DATE: usize = 3;
const COL_BEGIN_TIME: usize = 5;
const COL_END_TIME: usize = 6;
const COL_OWNER: usize = 7;
const COL_LOCATION: usize = 8;
const COL_SPACES: usize = 9;

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];
const TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Parse a sheet date in display (`MM/DD/YYYY`) or ISO form.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a sheet time of day, 12- or 24-hour clock.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// One `EventTime` per day from `begin` through `end` inclusive.
///
/// An absent end date, or one before `begin`, yields the begin day only.
pub fn explode(
    begin: NaiveDate,
    end: Option<NaiveDate>,
    window: Window,
) -> Result<Vec<EventTime>, EngineError> {
    let days = match end {
        Some(end) if end > begin => (end - begin).num_days() + 1,
        _ => 1,
    };
    if days > MAX_EVENT_DAYS {
        return Err(EngineError::LimitExceeded("event spans too many days"));
    }
    Ok(begin
        .iter_days()
        .take(days as usize)
        .map(|date| EventTime { date, window })
        .collect())
}

/// Parse the events table read at `anchor`. Scanning ends at the first row
/// with a blank name.
pub fn parse_events(
    rows: &[Vec<String>],
    anchor: CellRef,
    types: &TypeRegistry,
    spaces: &SpaceRegistry,
) -> Result<Vec<Event>, EngineError> {
    let mut events = Vec::new();
    for (offset, row) in rows_until_blank(rows, COL_NAME, MAX_EVENT_ROWS) {
        let id = EventId(anchor.offset(offset, 0));
        let event = parse_row(id, row, types, spaces)?;
        debug!(
            "event {}: type={} spaces={} days={}",
            event.id,
            event.event_type.id,
            event.spaces.len(),
            event.times.len()
        );
        events.push(event);
    }
    Ok(events)
}

fn parse_row(
    id: EventId,
    row: &[String],
    types: &TypeRegistry,
    spaces: &SpaceRegistry,
) -> Result<Event, EngineError> {
    let at = id.0;
    let name = table::cell(row, COL_NAME).to_string();

    let type_token = table::cell(row, COL_TYPE);
    let event_type = types
        .resolve(type_token)
        .cloned()
        .ok_or_else(|| EngineError::UnknownType {
            row: at,
            name: type_token.to_string(),
        })?;

    let begin_date = parse_date(table::cell(row, COL_BEGIN_DATE)).ok_or_else(|| {
        EngineError::invalid_row(
            at,
            format!("unreadable begin date {:?}", table::cell(row, COL_BEGIN_DATE)),
        )
    })?;
    let end_date = parse_date(table::cell(row, COL_END_DATE));

    let begin_time = optional_time(at, row, COL_BEGIN_TIME)?;
    let end_time = optional_time(at, row, COL_END_TIME)?;
    let whole_day = begin_time.is_none() && end_time.is_none();
    let begin = begin_time.unwrap_or(DAY_BEGIN);
    let end = end_time.unwrap_or_else(day_end);
    if end < begin {
        return Err(EngineError::invalid_row(
            at,
            format!("end time {} is before begin time {}", end.format("%H:%M"), begin.format("%H:%M")),
        ));
    }

    let location = table::cell(row, COL_LOCATION);
    let spaces = resolve_spaces(at, location, table::cell(row, COL_SPACES), spaces)?;
    let times = explode(begin_date, end_date, Window::new(begin, end))?;

    Ok(Event {
        id,
        name,
        event_type,
        spaces,
        times,
        owner: table::optional_cell(row, COL_OWNER).map(String::from),
        whole_day,
    })
}

fn optional_time(at: CellRef, row: &[String], col: usize) -> Result<Option<NaiveTime>, EngineError> {
    match table::optional_cell(row, col) {
        None => Ok(None),
        Some(raw) => parse_time(raw)
            .map(Some)
            .ok_or_else(|| EngineError::invalid_row(at, format!("unreadable time {raw:?}"))),
    }
}

/// Resolve a comma-separated space list within `location`.
///
/// A token naming one of the location's groups expands to the whole group and
/// discards every other token, resolvable or not.
fn resolve_spaces(
    at: CellRef,
    location: &str,
    list: &str,
    registry: &SpaceRegistry,
) -> Result<Vec<Space>, EngineError> {
    let tokens: Vec<&str> = list.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();

    if let Some((token, group)) = tokens
        .iter()
        .find_map(|token| registry.group(location, token).map(|group| (token, group)))
    {
        if group.is_empty() {
            return Err(EngineError::EmptySpaceGroup {
                location: location.to_string(),
                name: token.to_string(),
            });
        }
        return Ok(group.into_iter().cloned().collect());
    }

    let mut result: Vec<Space> = Vec::new();
    for token in tokens {
        let space = registry
            .space_by_name(location, token)
            .ok_or_else(|| EngineError::UnknownSpace {
                row: at,
                location: location.to_string(),
                name: token.to_string(),
            })?;
        if !result.iter().any(|s| s.id == space.id) {
            result.push(space.clone());
        }
    }
    if result.is_empty() {
        return Err(EngineError::invalid_row(at, "no space listed"));
    }
    Ok(result)
}
