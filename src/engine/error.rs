use chrono::NaiveDate;

use crate::a1::CellRef;

/// Which invariant class an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source data or sheet setup the operator must fix.
    Configuration,
    /// A single row of an input table could not be read.
    MalformedRow,
    /// The grid store failed a read or write.
    Io,
}

#[derive(Debug)]
pub enum EngineError {
    DateNotInGrid(NaiveDate),
    UnknownType {
        row: CellRef,
        name: String,
    },
    UnknownSpace {
        row: CellRef,
        location: String,
        name: String,
    },
    EmptySpaceGroup {
        location: String,
        name: String,
    },
    UnknownLocation(String),
    NoLocations,
    InvalidRow {
        row: CellRef,
        reason: String,
    },
    LimitExceeded(&'static str),
    Store(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidRow { .. } => ErrorKind::MalformedRow,
            EngineError::Store(_) => ErrorKind::Io,
            EngineError::DateNotInGrid(_)
            | EngineError::UnknownType { .. }
            | EngineError::UnknownSpace { .. }
            | EngineError::EmptySpaceGroup { .. }
            | EngineError::UnknownLocation(_)
            | EngineError::NoLocations
            | EngineError::LimitExceeded(_) => ErrorKind::Configuration,
        }
    }

    pub(crate) fn invalid_row(row: CellRef, reason: impl Into<String>) -> Self {
        EngineError::InvalidRow {
            row,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::DateNotInGrid(date) => write!(
                f,
                "date {date} not found in calendar grid: every event must fall within the planning year printed on the calendar sheets"
            ),
            EngineError::UnknownType { row, name } => {
                write!(f, "row {row}: unknown event type {name:?}")
            }
            EngineError::UnknownSpace {
                row,
                location,
                name,
            } => write!(f, "row {row}: unknown space {name:?} in location {location:?}"),
            EngineError::EmptySpaceGroup { location, name } => {
                write!(f, "space group {name:?} in location {location:?} has no spaces")
            }
            EngineError::UnknownLocation(location) => {
                write!(f, "no calendar sheet configured for location {location:?}")
            }
            EngineError::NoLocations => write!(f, "no locations configured on the spaces sheet"),
            EngineError::InvalidRow { row, reason } => write!(f, "row {row}: {reason}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Store(e) => write!(f, "grid store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
