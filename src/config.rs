use std::path::PathBuf;
use std::str::FromStr;

use crate::a1::{CellRange, CellRef};
use crate::grid::GridLayout;

/// Where each input table lives in the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub event_types_sheet: String,
    pub event_types_anchor: CellRef,
    pub spaces_sheet: String,
    pub spaces_anchor: CellRef,
    pub events_sheet: String,
    pub events_anchor: CellRef,
    /// Helper column holding `=WEEKNUM(<begin date>)`.
    pub events_week_column: usize,
    /// Helper column holding the row check formula.
    pub events_check_column: usize,
    pub check_formula: String,
    /// Range of every calendar sheet that holds the printed year.
    pub calendar_range: CellRange,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            event_types_sheet: "Setup_Event Types".into(),
            event_types_anchor: CellRef::new(1, 0),
            spaces_sheet: "Setup_Spaces".into(),
            spaces_anchor: CellRef::new(1, 1),
            events_sheet: "Event List".into(),
            events_anchor: CellRef::new(3, 0),
            events_week_column: 4,
            events_check_column: 11,
            check_formula: "=HOPE_CALENDAR_CHECK()".into(),
            calendar_range: CellRange::new(CellRef::new(0, 0), 97, 31),
        }
    }
}

/// Font applied to every rendered text run.
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    pub family: String,
    pub size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Arial".into(),
            size: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workbook: PathBuf,
    pub request_log: Option<PathBuf>,
    pub metrics_port: Option<u16>,
    pub sheets: SheetLayout,
    pub grid: GridLayout,
    pub font: FontConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("./workbook.json"),
            request_log: None,
            metrics_port: None,
            sheets: SheetLayout::default(),
            grid: GridLayout::default(),
            font: FontConfig::default(),
        }
    }
}

impl Config {
    /// Build from `HOPECAL_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("HOPECAL_WORKBOOK") {
            config.workbook = PathBuf::from(path);
        }
        config.request_log = std::env::var("HOPECAL_REQUEST_LOG").ok().map(PathBuf::from);
        config.metrics_port = env_parse("HOPECAL_METRICS_PORT");

        if let Ok(name) = std::env::var("HOPECAL_EVENT_TYPES_SHEET") {
            config.sheets.event_types_sheet = name;
        }
        if let Ok(name) = std::env::var("HOPECAL_SPACES_SHEET") {
            config.sheets.spaces_sheet = name;
        }
        if let Ok(name) = std::env::var("HOPECAL_EVENTS_SHEET") {
            config.sheets.events_sheet = name;
        }
        if let Some(range) = env_parse("HOPECAL_CALENDAR_RANGE") {
            config.sheets.calendar_range = range;
        }
        if let Some(label) = std::env::var("HOPECAL_WEEKDAY_LABEL").ok().filter(|s| !s.is_empty()) {
            config.grid.weekday_label = label;
        }

        if let Ok(family) = std::env::var("HOPECAL_FONT_FAMILY") {
            config.font.family = family;
        }
        if let Some(size) = env_parse("HOPECAL_FONT_SIZE") {
            config.font.size = size;
        }
        config
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
