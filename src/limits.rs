// ── Table geometry ──────────────────────────────────────────

/// Rows in the event-types table (safety bound for the sentinel scan).
pub const MAX_EVENT_TYPES: usize = 29;

/// Location columns in the spaces table.
pub const MAX_LOCATIONS: usize = 6;

/// Rows in the spaces table, header rows included.
pub const MAX_SPACE_ROWS: usize = 29;

/// Rows read from the events table before the sentinel scan gives up.
pub const MAX_EVENT_ROWS: usize = 2000;

/// Columns in the events table.
pub const EVENT_COLUMNS: usize = 10;

// ── Event bounds ────────────────────────────────────────────

/// Longest begin/end date range a single event row may cover.
pub const MAX_EVENT_DAYS: i64 = 366;

// ── Calendar grid ───────────────────────────────────────────

pub const DAYS_PER_WEEK: usize = 7;

/// Each day occupies two horizontally merged columns.
pub const MERGED_CELL_WIDTH: usize = 2;

/// Each week band occupies two rows: the date row and the content row.
pub const WEEK_BAND_HEIGHT: usize = 2;

/// Cells written per week band: every day slot, both halves of the merge.
pub const BAND_CELLS: usize = DAYS_PER_WEEK * MERGED_CELL_WIDTH;
