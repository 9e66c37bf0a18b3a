//! The two surface commands, each run against a freshly loaded [`Session`].

use std::time::Instant;

use tracing::{debug, info};

use crate::a1::{CellRange, CellRef};
use crate::catalog::{self, COL_BEGIN_DATE};
use crate::config::{Config, SheetLayout};
use crate::engine::{ConflictSet, EngineError, ScheduleIndex};
use crate::grid::CalendarGrid;
use crate::limits::*;
use crate::model::Event;
use crate::observability::{self, CELLS_WRITTEN_TOTAL, EVENTS_LOADED_TOTAL, REFRESH_DURATION_SECONDS, REFRESH_TOTAL};
use crate::registry::{SpaceRegistry, TypeRegistry};
use crate::render::Calendar;
use crate::render::wire::{CellUpdate, UpdateCells};
use crate::store::GridStore;
use crate::table::rows_until_blank;

/// Everything one refresh reads from the setup sheets. Nothing outlives the run.
#[derive(Debug)]
pub struct Session {
    pub types: TypeRegistry,
    pub spaces: SpaceRegistry,
    pub events: Vec<Event>,
}

impl Session {
    pub async fn load(store: &dyn GridStore, sheets: &SheetLayout) -> Result<Self, EngineError> {
        let rows = store
            .read_range(
                &sheets.event_types_sheet,
                &CellRange::new(sheets.event_types_anchor, MAX_EVENT_TYPES, 1),
            )
            .await?;
        let types = TypeRegistry::load(&rows, sheets.event_types_anchor);

        let rows = store
            .read_range(
                &sheets.spaces_sheet,
                &CellRange::new(sheets.spaces_anchor, MAX_SPACE_ROWS, MAX_LOCATIONS),
            )
            .await?;
        let spaces = SpaceRegistry::load(&rows, sheets.spaces_anchor);
        if spaces.calendars().is_empty() {
            return Err(EngineError::NoLocations);
        }

        let rows = store
            .read_range(
                &sheets.events_sheet,
                &CellRange::new(sheets.events_anchor, MAX_EVENT_ROWS, EVENT_COLUMNS),
            )
            .await?;
        let events = catalog::parse_events(&rows, sheets.events_anchor, &types, &spaces)?;
        metrics::counter!(EVENTS_LOADED_TOTAL).increment(events.len() as u64);

        debug!("event types: {types:?}");
        debug!("spaces: {spaces:?}");
        info!(
            "session loaded: {} types, {} spaces in {} locations, {} events",
            types.len(),
            spaces.len(),
            spaces.calendars().len(),
            events.len()
        );
        Ok(Self { types, spaces, events })
    }

    /// Calendar sheet of `location`, which must be named.
    pub fn calendar_sheet(&self, location: &str) -> Result<&str, EngineError> {
        self.spaces
            .calendar_sheet(location)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::UnknownLocation(location.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSummary {
    pub events: usize,
    pub schedules: usize,
    /// (date, event) pairs carrying the conflict warning.
    pub flagged: usize,
    pub sheets: usize,
    pub cells: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventsSummary {
    pub rows: usize,
}

// ── refresh calendar ─────────────────────────────────────────────

/// Rebuild every location's calendar sheet from the event list.
pub async fn refresh_calendar(store: &dyn GridStore, config: &Config) -> Result<CalendarSummary, EngineError> {
    let start = Instant::now();
    let result = run_calendar(store, config).await;
    record_run("refresh_calendar", start, &result);
    if let Ok(summary) = &result {
        info!(
            "calendar refreshed: {} events, {} schedules, {} flagged, {} cells over {} sheets",
            summary.events, summary.schedules, summary.flagged, summary.cells, summary.sheets
        );
    }
    result
}

async fn run_calendar(store: &dyn GridStore, config: &Config) -> Result<CalendarSummary, EngineError> {
    let session = Session::load(store, &config.sheets).await?;

    let mut index = ScheduleIndex::build(&session.events);
    let conflicts = ConflictSet::detect(&mut index);

    // Every calendar sheet prints the same year; the first one is mapped.
    let (first_location, _) = session
        .spaces
        .calendars()
        .first()
        .ok_or(EngineError::NoLocations)?;
    let grid_sheet = session.calendar_sheet(first_location)?;
    let values = store.read_range(grid_sheet, &config.sheets.calendar_range).await?;
    let grid = CalendarGrid::map(&values, &config.grid).anchored_at(config.sheets.calendar_range.start);
    debug!("grid {grid_sheet}: {} dates in {} week bands", grid.len(), grid.bands().len());

    let mut calendar = Calendar::new(&grid, session.spaces.locations());
    let mut flagged = 0;
    for (date, _space, bucket) in index.buckets() {
        for schedule in bucket {
            let warning = conflicts.has_conflict(date, schedule.event_id());
            if calendar.set(date, *schedule, warning) && warning {
                flagged += 1;
            }
        }
    }

    let batches = calendar.render(&grid, &config.font)?;
    let mut summary = CalendarSummary {
        events: session.events.len(),
        schedules: index.len(),
        flagged,
        ..CalendarSummary::default()
    };
    for batch in batches {
        let sheet = session.calendar_sheet(&batch.location)?;
        let sheet_id = store.sheet_id(sheet).await?;
        let cells: usize = batch.requests.iter().map(UpdateCells::cell_count).sum();
        store.batch_write_cells(sheet_id, batch.requests).await?;
        metrics::counter!(CELLS_WRITTEN_TOTAL, "sheet" => sheet.to_string()).increment(cells as u64);
        info!("wrote {cells} cells to {sheet} ({})", batch.location);
        summary.sheets += 1;
        summary.cells += cells;
    }
    Ok(summary)
}

// ── refresh events ───────────────────────────────────────────────

/// Rewrite the helper formulas of every row of the event list.
pub async fn refresh_events(store: &dyn GridStore, config: &Config) -> Result<EventsSummary, EngineError> {
    let start = Instant::now();
    let result = run_events(store, &config.sheets).await;
    record_run("refresh_events", start, &result);
    if let Ok(summary) = &result {
        info!("event list refreshed: {} rows", summary.rows);
    }
    result
}

async fn run_events(store: &dyn GridStore, sheets: &SheetLayout) -> Result<EventsSummary, EngineError> {
    let anchor = sheets.events_anchor;
    let rows = store
        .read_range(&sheets.events_sheet, &CellRange::new(anchor, MAX_EVENT_ROWS, 1))
        .await?;

    let mut requests = Vec::new();
    for (offset, _) in rows_until_blank(&rows, 0, MAX_EVENT_ROWS) {
        let row = anchor.row + offset;
        let begin_date = CellRef::new(row, anchor.col + COL_BEGIN_DATE);
        requests.push(formula_cell(row, sheets.events_week_column, format!("=WEEKNUM({begin_date})")));
        requests.push(formula_cell(row, sheets.events_check_column, sheets.check_formula.clone()));
    }

    let summary = EventsSummary { rows: requests.len() / 2 };
    if requests.is_empty() {
        return Ok(summary);
    }
    let sheet_id = store.sheet_id(&sheets.events_sheet).await?;
    let cells = requests.len();
    store.batch_write_cells(sheet_id, requests).await?;
    metrics::counter!(CELLS_WRITTEN_TOTAL, "sheet" => sheets.events_sheet.clone()).increment(cells as u64);
    Ok(summary)
}

fn formula_cell(row: usize, column: usize, formula: String) -> UpdateCells {
    UpdateCells {
        start_row: row,
        start_column: column,
        rows: vec![vec![CellUpdate::formula(formula)]],
    }
}

fn record_run<T>(command: &'static str, start: Instant, result: &Result<T, EngineError>) {
    let status = observability::status_label(result);
    metrics::counter!(REFRESH_TOTAL, "command" => command, "status" => status).increment(1);
    metrics::histogram!(REFRESH_DURATION_SECONDS, "command" => command).record(start.elapsed().as_secs_f64());
}
