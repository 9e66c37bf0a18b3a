pub mod rich_text;
pub mod wire;

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::config::FontConfig;
use crate::engine::{EngineError, Schedule};
use crate::grid::{CalendarGrid, WeekBand};
use crate::limits::BAND_CELLS;
use crate::model::EventId;

use rich_text::{compose, Line, Rgb, Style};
use wire::{CellUpdate, UpdateCells};

// ── Styles ───────────────────────────────────────────────────────

const DARK_GREY: Rgb = Rgb(0x43, 0x43, 0x43);
const BLUE: Rgb = Rgb(0x4a, 0x86, 0xe8);
const GREY: Rgb = Rgb(0x99, 0x99, 0x99);

pub const STYLE_TITLE: Style = Style::colored(DARK_GREY).bold();
pub const STYLE_TIME: Style = Style::colored(BLUE);
pub const STYLE_SPACES: Style = Style::colored(DARK_GREY);
pub const STYLE_OWNER: Style = Style::colored(GREY);

pub const WARNING_ICON: &str = "\u{26A0}\u{FE0F}";

// ── Entries ──────────────────────────────────────────────────────

/// One rendered line: an event on a date, flagged when it conflicts.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub schedule: Schedule<'a>,
    pub warning: bool,
}

impl Entry<'_> {
    /// `[⚠️][C] name`, then time range (timed events only), spaces and owner.
    pub fn to_line(&self) -> Line {
        let event = self.schedule.event;
        let mut line = Line::default();
        let warn = if self.warning { WARNING_ICON } else { "" };
        line.push(
            format!("{warn}[{}] {}", event.event_type.code, event.name),
            STYLE_TITLE,
        );
        if !event.whole_day {
            line.push(self.schedule.window.to_string(), STYLE_TIME);
        }
        let spaces: Vec<&str> = event.spaces.iter().map(|s| s.name.as_str()).collect();
        line.push(spaces.join(","), STYLE_SPACES);
        if let Some(owner) = &event.owner {
            line.push(owner.clone(), STYLE_OWNER);
        }
        line
    }
}

/// Entries accepted for one date, in the order they were fed in.
#[derive(Debug, Default)]
pub struct DateRecord<'a> {
    added: HashSet<EventId>,
    entries: Vec<Entry<'a>>,
}

impl<'a> DateRecord<'a> {
    /// Add an entry unless its event is already on this date (an event in
    /// several spaces is fed once per space). Returns whether it was added.
    pub fn add(&mut self, entry: Entry<'a>) -> bool {
        if !self.added.insert(entry.schedule.event_id()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Entries grouped by the location of each event's first space, groups in
    /// first-seen order, entries in insertion order.
    pub fn by_location(&self) -> Vec<(&str, Vec<&Entry<'a>>)> {
        let mut groups: Vec<(&str, Vec<&Entry<'a>>)> = Vec::new();
        for entry in &self.entries {
            let location = entry.schedule.event.location();
            match groups.iter_mut().find(|(loc, _)| *loc == location) {
                Some((_, list)) => list.push(entry),
                None => groups.push((location, vec![entry])),
            }
        }
        groups
    }
}

// ── Calendar ─────────────────────────────────────────────────────

/// Update requests for one location's calendar sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetBatch {
    pub location: String,
    pub requests: Vec<UpdateCells>,
}

/// Accumulates date records and renders them into per-location batches.
pub struct Calendar<'a> {
    records: BTreeMap<NaiveDate, DateRecord<'a>>,
    /// Per location: one pre-blanked row of cells per week band.
    sheets: Vec<(String, BTreeMap<WeekBand, Vec<CellUpdate>>)>,
}

impl<'a> Calendar<'a> {
    /// Every week band of every location starts out blank, so a refresh also
    /// clears days that no longer have events.
    pub fn new<I, S>(grid: &CalendarGrid, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let blank_rows: BTreeMap<WeekBand, Vec<CellUpdate>> = grid
            .bands()
            .iter()
            .map(|band| (*band, vec![CellUpdate::blank(); BAND_CELLS]))
            .collect();
        Self {
            records: BTreeMap::new(),
            sheets: locations
                .into_iter()
                .map(|loc| (loc.into(), blank_rows.clone()))
                .collect(),
        }
    }

    pub fn set(&mut self, date: NaiveDate, schedule: Schedule<'a>, warning: bool) -> bool {
        self.records
            .entry(date)
            .or_default()
            .add(Entry { schedule, warning })
    }

    pub fn record(&self, date: NaiveDate) -> Option<&DateRecord<'a>> {
        self.records.get(&date)
    }

    /// Lay every date record onto the grid. Fails on the first date the grid
    /// does not print.
    pub fn render(mut self, grid: &CalendarGrid, font: &FontConfig) -> Result<Vec<SheetBatch>, EngineError> {
        let mut cells = 0u64;
        for (date, record) in &self.records {
            let pos = grid.position(*date)?;
            for (location, entries) in record.by_location() {
                let lines: Vec<Line> = entries.iter().map(|e| e.to_line()).collect();
                let cell = CellUpdate::styled(&compose(&lines), font);

                let rows = self
                    .sheets
                    .iter_mut()
                    .find(|(loc, _)| loc == location)
                    .map(|(_, rows)| rows)
                    .ok_or_else(|| EngineError::UnknownLocation(location.to_string()))?;
                let band = WeekBand {
                    row: pos.row,
                    column: pos.column,
                };
                let row = rows
                    .entry(band)
                    .or_insert_with(|| vec![CellUpdate::blank(); BAND_CELLS]);
                row[pos.day_offset] = cell;
                cells += 1;
                debug!("{date} {location}: {} entries at {band:?}+{}", entries.len(), pos.day_offset);
            }
        }
        metrics::counter!(crate::observability::CELLS_RENDERED_TOTAL).increment(cells);

        Ok(self
            .sheets
            .drain(..)
            .map(|(location, rows)| SheetBatch {
                location,
                requests: rows
                    .into_iter()
                    .map(|(band, row)| UpdateCells {
                        start_row: band.row,
                        start_column: band.column,
                        rows: vec![row],
                    })
                    .collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::a1::CellRef;
    use crate::grid::{printed_year, GridLayout};
    use crate::model::*;
    use wire::ExtendedValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn space(row: usize, col: usize, location: &str, name: &str) -> Space {
        Space {
            id: SpaceId(CellRef::new(row, col)),
            location: location.into(),
            name: name.into(),
        }
    }

    fn event(row: usize, name: &str, spaces: Vec<Space>, window: Option<Window>, owner: Option<&str>) -> Event {
        Event {
            id: EventId(CellRef::new(row - 1, 0)),
            name: name.into(),
            event_type: EventType::new(TypeId(CellRef::new(1, 0)), "Meeting"),
            spaces,
            times: vec![],
            owner: owner.map(String::from),
            whole_day: window.is_none(),
        }
    }

    fn schedule(event: &Event, window: Option<Window>) -> Schedule<'_> {
        Schedule {
            event,
            window: window.unwrap_or_else(Window::whole_day),
        }
    }

    fn text(cell: &CellUpdate) -> &str {
        cell.user_entered_value.as_str()
    }

    #[test]
    fn line_for_timed_event_with_owner() {
        let w = Window::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        );
        let e = event(
            4,
            "Board",
            vec![space(4, 1, "North", "Hall"), space(5, 1, "North", "Lobby")],
            Some(w),
            Some("Ann"),
        );
        let line = Entry { schedule: schedule(&e, Some(w)), warning: false }.to_line();
        assert_eq!(line.text(), "[M] Board 09:00-10:30 Hall,Lobby Ann");
        let styles: Vec<_> = line.spans.iter().map(|s| s.style).collect();
        assert_eq!(styles, vec![STYLE_TITLE, STYLE_TIME, STYLE_SPACES, STYLE_OWNER]);
    }

    #[test]
    fn line_for_whole_day_warning() {
        let e = event(4, "Fair", vec![space(4, 1, "North", "Hall")], None, None);
        let line = Entry { schedule: schedule(&e, None), warning: true }.to_line();
        assert_eq!(line.text(), "\u{26A0}\u{FE0F}[M] Fair Hall");
        assert_eq!(line.spans.len(), 2);
    }

    #[test]
    fn multi_space_event_recorded_once_per_date() {
        let spaces = vec![
            space(4, 1, "North", "Hall"),
            space(5, 1, "North", "Lobby"),
            space(6, 1, "North", "Kitchen"),
        ];
        let e = event(4, "Fair", spaces, None, None);
        let grid = CalendarGrid::map(&printed_year(2024), &GridLayout::default());
        let mut cal = Calendar::new(&grid, ["North"]);
        let day = date(2024, 5, 4);
        assert!(cal.set(day, schedule(&e, None), false));
        assert!(!cal.set(day, schedule(&e, None), true));
        assert!(!cal.set(day, schedule(&e, None), false));
        let record = cal.record(day).unwrap();
        assert_eq!(record.entries().len(), 1);
        assert_eq!(record.by_location().len(), 1);
    }

    #[test]
    fn grouping_preserves_insertion_order() {
        let a = event(4, "A", vec![space(4, 2, "South", "Studio")], None, None);
        let b = event(5, "B", vec![space(4, 1, "North", "Hall")], None, None);
        let c = event(6, "C", vec![space(4, 2, "South", "Studio")], None, None);
        let mut record = DateRecord::default();
        for e in [&a, &b, &c] {
            record.add(Entry { schedule: schedule(e, None), warning: false });
        }
        let groups: Vec<(&str, Vec<&str>)> = record
            .by_location()
            .into_iter()
            .map(|(loc, es)| (loc, es.iter().map(|e| e.schedule.event.name.as_str()).collect()))
            .collect();
        assert_eq!(groups, vec![("South", vec!["A", "C"]), ("North", vec!["B"])]);
    }

    #[test]
    fn render_writes_block_at_position() {
        let hall = space(4, 1, "North", "Hall");
        let a = event(4, "A", vec![hall.clone()], None, None);
        let b = event(5, "B", vec![hall.clone()], None, Some("Bo"));
        let grid = CalendarGrid::map(&printed_year(2024), &GridLayout::default());
        let mut cal = Calendar::new(&grid, ["North", "South"]);
        let day = date(2024, 1, 1);
        cal.set(day, schedule(&a, None), true);
        cal.set(day, schedule(&b, None), false);

        let batches = cal.render(&grid, &FontConfig::default()).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].location, "North");
        assert_eq!(batches[0].requests.len(), grid.bands().len());

        let pos = grid.position(day).unwrap();
        let req = batches[0]
            .requests
            .iter()
            .find(|r| r.start_row == pos.row && r.start_column == pos.column)
            .unwrap();
        assert_eq!(req.rows.len(), 1);
        assert_eq!(req.rows[0].len(), BAND_CELLS);
        let cell = &req.rows[0][pos.day_offset];
        assert_eq!(text(cell), "\u{26A0}\u{FE0F}[M] A Hall\n[M] B Hall Bo");
        // The icon is two UTF-16 units; every separator gets a plain run
        let starts: Vec<_> = cell.text_format_runs.iter().map(|r| r.start_index).collect();
        assert_eq!(starts, vec![0, 7, 8, 12, 13, 18, 19, 23, 24]);
        assert!(cell.text_format_runs[0].format.bold);
        assert!(cell.text_format_runs[1].format.foreground_color_style.is_none());
        // Other slots of the band stay blank
        assert_eq!(text(&req.rows[0][0]), "");
        assert_eq!(req.rows[0][0].user_entered_value, ExtendedValue::StringValue(String::new()));

        // The other location only gets blank rows
        assert!(batches[1]
            .requests
            .iter()
            .all(|r| r.rows[0].iter().all(|c| text(c).is_empty())));
    }

    #[test]
    fn render_fails_for_date_outside_grid() {
        let e = event(4, "Late", vec![space(4, 1, "North", "Hall")], None, None);
        let grid = CalendarGrid::map(&printed_year(2024), &GridLayout::default());
        let mut cal = Calendar::new(&grid, ["North"]);
        cal.set(date(2025, 1, 2), schedule(&e, None), false);
        let err = cal.render(&grid, &FontConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::DateNotInGrid(_)));
    }

    #[test]
    fn render_rejects_location_without_sheet() {
        let e = event(4, "Lost", vec![space(4, 3, "East", "Barn")], None, None);
        let grid = CalendarGrid::map(&printed_year(2024), &GridLayout::default());
        let mut cal = Calendar::new(&grid, ["North"]);
        cal.set(date(2024, 1, 2), schedule(&e, None), false);
        let err = cal.render(&grid, &FontConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownLocation(ref l) if l == "East"));
    }
}
