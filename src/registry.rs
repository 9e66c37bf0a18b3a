use std::collections::{BTreeMap, HashMap};

use crate::a1::CellRef;
use crate::limits::*;
use crate::model::*;
use crate::table::{self, rows_until_blank};

// ── Event types ──────────────────────────────────────────────────

/// Event types read from a single-column table of names.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: BTreeMap<TypeId, EventType>,
    by_name: HashMap<String, TypeId>,
}

impl TypeRegistry {
    /// `rows` is the range read at `anchor`; the first blank name ends the table.
    pub fn load(rows: &[Vec<String>], anchor: CellRef) -> Self {
        let mut registry = Self::default();
        for (offset, row) in rows_until_blank(rows, 0, MAX_EVENT_TYPES) {
            let id = TypeId(anchor.offset(offset, 0));
            registry.insert(EventType::new(id, table::cell(row, 0)));
        }
        registry
    }

    pub fn insert(&mut self, event_type: EventType) {
        self.by_name.insert(event_type.name.clone(), event_type.id);
        self.types.insert(event_type.id, event_type);
    }

    pub fn type_by_id(&self, id: &TypeId) -> Option<&EventType> {
        self.types.get(id)
    }

    pub fn type_by_name(&self, name: &str) -> Option<&EventType> {
        self.by_name.get(name).and_then(|id| self.types.get(id))
    }

    /// Resolve the type column of an event row: exact name first, then the
    /// type's cell address, then a single-letter code if exactly one type
    /// carries it.
    pub fn resolve(&self, token: &str) -> Option<&EventType> {
        if let Some(ty) = self.type_by_name(token) {
            return Some(ty);
        }
        if let Some(ty) = token
            .parse::<CellRef>()
            .ok()
            .and_then(|cell| self.type_by_id(&TypeId(cell)))
        {
            return Some(ty);
        }
        let mut by_code = self.types.values().filter(|ty| ty.code == token);
        match (by_code.next(), by_code.next()) {
            (Some(ty), None) => Some(ty),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ── Spaces ───────────────────────────────────────────────────────

const LOCATION_ROW: usize = 0;
const CALENDAR_ROW: usize = 1;
const GROUP_ROW: usize = 2;
const FIRST_SPACE_ROW: usize = 3;

/// Spaces, their "all spaces" groups and per-location calendar sheets.
///
/// The source table has one column per location: location name, calendar sheet
/// name, group label, then one space name per row.
#[derive(Debug, Default)]
pub struct SpaceRegistry {
    spaces: BTreeMap<SpaceId, Space>,
    by_name: HashMap<(String, String), SpaceId>,
    groups: HashMap<(String, String), Vec<SpaceId>>,
    /// (location, calendar sheet), in table order.
    calendars: Vec<(String, String)>,
}

impl SpaceRegistry {
    pub fn load(rows: &[Vec<String>], anchor: CellRef) -> Self {
        let mut registry = Self::default();
        let header = rows.get(LOCATION_ROW).map(Vec::as_slice).unwrap_or_default();

        for col in 0..MAX_LOCATIONS {
            let location = table::cell(header, col);
            if location.is_empty() {
                break;
            }
            let column = table::column(rows, col);
            let calendar = column.get(CALENDAR_ROW).copied().unwrap_or_default();
            let group = column.get(GROUP_ROW).copied().unwrap_or_default();

            let mut members = Vec::new();
            for (row, name) in column
                .iter()
                .enumerate()
                .take(MAX_SPACE_ROWS)
                .skip(FIRST_SPACE_ROW)
            {
                if name.is_empty() {
                    break;
                }
                let id = SpaceId(anchor.offset(row, col));
                registry.insert(Space {
                    id,
                    location: location.to_string(),
                    name: name.to_string(),
                });
                members.push(id);
            }

            if !group.is_empty() {
                registry
                    .groups
                    .insert((location.to_string(), group.to_string()), members);
            }
            registry
                .calendars
                .push((location.to_string(), calendar.to_string()));
        }
        registry
    }

    pub fn insert(&mut self, space: Space) {
        self.by_name
            .insert((space.location.clone(), space.name.clone()), space.id);
        self.spaces.insert(space.id, space);
    }

    pub fn space_by_id(&self, id: &SpaceId) -> Option<&Space> {
        self.spaces.get(id)
    }

    pub fn space_by_name(&self, location: &str, name: &str) -> Option<&Space> {
        self.by_name
            .get(&(location.to_string(), name.to_string()))
            .and_then(|id| self.spaces.get(id))
    }

    /// Members of a named group, `None` when no such group exists.
    pub fn group(&self, location: &str, name: &str) -> Option<Vec<&Space>> {
        self.groups
            .get(&(location.to_string(), name.to_string()))
            .map(|ids| ids.iter().filter_map(|id| self.spaces.get(id)).collect())
    }

    pub fn calendar_sheet(&self, location: &str) -> Option<&str> {
        self.calendars
            .iter()
            .find(|(loc, _)| loc == location)
            .map(|(_, sheet)| sheet.as_str())
    }

    /// (location, calendar sheet) pairs in table order.
    pub fn calendars(&self) -> &[(String, String)] {
        &self.calendars
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.calendars.iter().map(|(loc, _)| loc.as_str())
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}
