//! Mapping from calendar dates to cells of the printed annual grid.
//!
//! The calendar sheets print two months side by side per row band. Each month
//! block has a month-name row, a weekday header row, then up to six week bands.
//! A week band is two rows tall (date row, content row) and every day spans two
//! merged columns:
//!
//! ```text
//!        col+0  col+2  col+4  ...  col+12
//! r-1    January
//! r      Sunday Monday Tuesday ... Saturday
//! r+1    12/31  1/1    1/2    ...  1/6        <- date row
//! r+2    (events rendered here)               <- content row
//! r+3    1/7    1/8    ...
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Duration, Month, NaiveDate};
use tracing::warn;

use crate::a1::CellRef;
use crate::catalog::parse_date;
use crate::engine::EngineError;
use crate::limits::*;
use crate::table::cell;

/// Geometry of the printed grid. Rows and columns are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// First row scanned for weekday header rows.
    pub top: usize,
    /// Header text marking the first weekday column of a month block.
    pub weekday_label: String,
    /// Anchor column of each month block in a row band, left to right.
    pub anchors: Vec<usize>,
    /// Rows between the month name and the weekday header below it.
    pub month_label_offset: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            top: 2,
            weekday_label: "Sunday".into(),
            anchors: vec![1, 16],
            month_label_offset: 1,
        }
    }
}

/// Where a date's summary is written: the content row and anchor column of its
/// week band, plus the offset of its merged cell pair within the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePosition {
    pub row: usize,
    pub column: usize,
    pub day_offset: usize,
}

/// Content row of one week band; every band is rewritten on each refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeekBand {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarGrid {
    positions: BTreeMap<NaiveDate, DatePosition>,
    bands: Vec<WeekBand>,
}

impl CalendarGrid {
    /// Scan raw grid values for month blocks. Dates the grid does not print are
    /// simply absent; callers find out through [`CalendarGrid::position`].
    pub fn map(values: &[Vec<String>], layout: &GridLayout) -> Self {
        let mut grid = Self::default();
        let Some(&first_anchor) = layout.anchors.first() else {
            return grid;
        };
        for row in layout.top..values.len() {
            if cell(&values[row], first_anchor) == layout.weekday_label {
                for &anchor in &layout.anchors {
                    grid.digest_month(values, row, anchor, layout);
                }
            }
        }
        grid
    }

    fn digest_month(&mut self, values: &[Vec<String>], header: usize, col: usize, layout: &GridLayout) {
        let label = header
            .checked_sub(layout.month_label_offset)
            .map_or("", |r| cell(&values[r], col));
        let Some(month) = parse_month(label) else {
            warn!("no month name above weekday header at row {}, column {col}: {label:?}", header + 1);
            return;
        };

        let mut row = header + 1;
        while row < values.len() && !cell(&values[row], col).is_empty() {
            let content_row = row + 1;
            self.bands.push(WeekBand {
                row: content_row,
                column: col,
            });
            for day in 0..DAYS_PER_WEEK {
                let day_offset = day * MERGED_CELL_WIDTH;
                let Some(date) = parse_date(cell(&values[row], col + day_offset)) else {
                    continue;
                };
                // Spill-over days belong to the neighbouring month's block.
                if date.month() != month.number_from_month() {
                    continue;
                }
                self.positions.insert(
                    date,
                    DatePosition {
                        row: content_row,
                        column: col,
                        day_offset,
                    },
                );
            }
            row += WEEK_BAND_HEIGHT;
        }
    }

    /// Shift positions and bands from range-relative to sheet coordinates,
    /// where `origin` is the top-left cell of the range that was mapped.
    pub fn anchored_at(mut self, origin: CellRef) -> Self {
        for pos in self.positions.values_mut() {
            pos.row += origin.row;
            pos.column += origin.col;
        }
        for band in &mut self.bands {
            band.row += origin.row;
            band.column += origin.col;
        }
        self
    }

    pub fn position(&self, date: NaiveDate) -> Result<DatePosition, EngineError> {
        self.positions
            .get(&date)
            .copied()
            .ok_or(EngineError::DateNotInGrid(date))
    }

    pub fn positions(&self) -> &BTreeMap<NaiveDate, DatePosition> {
        &self.positions
    }

    /// Week bands in scan order.
    pub fn bands(&self) -> &[WeekBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// English month name or three-letter abbreviation, any case; trailing text
/// such as a year is ignored.
fn parse_month(label: &str) -> Option<Month> {
    label
        .split_whitespace()
        .next()
        .and_then(|word| Month::from_str(word).ok())
}

// ── Printed layout ──────────────────────────────────────────────

const WEEKDAYS: [&str; DAYS_PER_WEEK] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Rows per two-month band: month row, weekday row, six week bands, two spacers.
const MONTH_BAND_ROWS: usize = 16;

/// Display values of a blank annual calendar for `year` in the default layout
/// (97 rows × 31 columns, `A1:AE97`): a title row, then six bands of two months.
pub fn printed_year(year: i32) -> Vec<Vec<String>> {
    let layout = GridLayout::default();
    let width = layout.anchors.last().copied().unwrap_or(0) + DAYS_PER_WEEK * MERGED_CELL_WIDTH + 1;
    let mut values = vec![vec![String::new(); width]; 1 + 6 * MONTH_BAND_ROWS];
    values[0][0] = format!("{year}");

    for month0 in 0..12u32 {
        let Some(first) = NaiveDate::from_ymd_opt(year, month0 + 1, 1) else {
            continue;
        };
        let base = 1 + (month0 as usize / 2) * MONTH_BAND_ROWS;
        let col = layout.anchors[month0 as usize % 2];

        values[base][col] = first.format("%B").to_string();
        for (day, name) in WEEKDAYS.iter().enumerate() {
            values[base + 1][col + day * MERGED_CELL_WIDTH] = name.to_string();
        }

        let mut week_start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
        let mut row = base + 2;
        while week_start.month() == first.month() || week_start < first {
            for day in 0..DAYS_PER_WEEK {
                let date = week_start + Duration::days(day as i64);
                values[row][col + day * MERGED_CELL_WIDTH] = date.format("%m/%d/%Y").to_string();
            }
            week_start += Duration::days(DAYS_PER_WEEK as i64);
            row += WEEK_BAND_HEIGHT;
        }
    }
    values
}
