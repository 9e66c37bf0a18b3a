mod file;

pub use file::WorkbookFile;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::a1::CellRange;
use crate::engine::EngineError;
use crate::render::wire::UpdateCells;

pub type SheetId = i64;

/// The grid document holding every input table and calendar sheet.
#[async_trait]
pub trait GridStore: Send + Sync {
    /// Display values of `range`, always the full rectangle (blank-padded).
    async fn read_range(&self, sheet: &str, range: &CellRange) -> Result<Vec<Vec<String>>, EngineError>;

    async fn sheet_id(&self, sheet: &str) -> Result<SheetId, EngineError>;

    /// Apply all `requests` to one sheet in a single call.
    async fn batch_write_cells(&self, sheet: SheetId, requests: Vec<UpdateCells>) -> Result<(), EngineError>;
}

// ── Workbook model ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: SheetId,
    pub name: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl Sheet {
    pub fn read(&self, range: &CellRange) -> Vec<Vec<String>> {
        (range.start.row..=range.end.row)
            .map(|r| {
                let row = self.values.get(r);
                (range.start.col..=range.end.col)
                    .map(|c| row.and_then(|row| row.get(c)).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    /// Write the plain values of a request, growing the sheet as needed.
    pub fn apply(&mut self, request: &UpdateCells) {
        for (i, cells) in request.rows.iter().enumerate() {
            let r = request.start_row + i;
            if self.values.len() <= r {
                self.values.resize_with(r + 1, Vec::new);
            }
            let row = &mut self.values[r];
            for (j, cell) in cells.iter().enumerate() {
                let c = request.start_column + j;
                if row.len() <= c {
                    row.resize(c + 1, String::new());
                }
                row[c] = cell.user_entered_value.as_str().to_string();
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Add a sheet and return its id.
    pub fn add_sheet(&mut self, name: impl Into<String>, values: Vec<Vec<String>>) -> SheetId {
        let id = self.sheets.iter().map(|s| s.id + 1).max().unwrap_or(0);
        self.sheets.push(Sheet {
            id,
            name: name.into(),
            values,
        });
        id
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, EngineError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| EngineError::Store(format!("no sheet named {name:?}")))
    }

    pub fn sheet_by_id_mut(&mut self, id: SheetId) -> Result<&mut Sheet, EngineError> {
        self.sheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::Store(format!("no sheet with id {id}")))
    }

    pub fn apply(&mut self, sheet: SheetId, requests: &[UpdateCells]) -> Result<(), EngineError> {
        let sheet = self.sheet_by_id_mut(sheet)?;
        for request in requests {
            sheet.apply(request);
        }
        Ok(())
    }
}

// ── In-memory store ──────────────────────────────────────────────

/// Workbook held in memory. Every batch is recorded as well as applied.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workbook: RwLock<Workbook>,
    writes: Mutex<Vec<(SheetId, Vec<UpdateCells>)>>,
}

impl MemoryStore {
    pub fn new(workbook: Workbook) -> Self {
        Self {
            workbook: RwLock::new(workbook),
            ..Self::default()
        }
    }

    /// Batches received so far, in call order.
    pub async fn writes(&self) -> Vec<(SheetId, Vec<UpdateCells>)> {
        self.writes.lock().await.clone()
    }

    pub async fn workbook(&self) -> Workbook {
        self.workbook.read().await.clone()
    }
}

#[async_trait]
impl GridStore for MemoryStore {
    async fn read_range(&self, sheet: &str, range: &CellRange) -> Result<Vec<Vec<String>>, EngineError> {
        let workbook = self.workbook.read().await;
        Ok(workbook.sheet(sheet)?.read(range))
    }

    async fn sheet_id(&self, sheet: &str) -> Result<SheetId, EngineError> {
        Ok(self.workbook.read().await.sheet(sheet)?.id)
    }

    async fn batch_write_cells(&self, sheet: SheetId, requests: Vec<UpdateCells>) -> Result<(), EngineError> {
        self.workbook.write().await.apply(sheet, &requests)?;
        self.writes.lock().await.push((sheet, requests));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::wire::CellUpdate;

    fn values(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn read_pads_to_full_range() {
        let sheet = Sheet {
            id: 0,
            name: "s".into(),
            values: values(&[&["a", "b"], &["c"]]),
        };
        let out = sheet.read(&"A1:C3".parse().unwrap());
        assert_eq!(out, values(&[&["a", "b", ""], &["c", "", ""], &["", "", ""]]));
        let out = sheet.read(&"B1:B2".parse().unwrap());
        assert_eq!(out, values(&[&["b"], &[""]]));
    }

    #[test]
    fn apply_grows_sheet() {
        let mut sheet = Sheet {
            id: 0,
            name: "s".into(),
            values: vec![],
        };
        sheet.apply(&UpdateCells {
            start_row: 2,
            start_column: 1,
            rows: vec![vec![CellUpdate::text("x"), CellUpdate::formula("=1")]],
        });
        assert_eq!(sheet.values.len(), 3);
        assert_eq!(sheet.values[2], vec!["", "x", "=1"]);
    }

    #[test]
    fn sheet_ids_are_unique() {
        let mut wb = Workbook::default();
        let a = wb.add_sheet("a", vec![]);
        let b = wb.add_sheet("b", vec![]);
        assert_ne!(a, b);
        assert!(wb.sheet("c").is_err());
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let mut wb = Workbook::default();
        wb.add_sheet("Cal", values(&[&["x"]]));
        let store = MemoryStore::new(wb);

        let id = store.sheet_id("Cal").await.unwrap();
        store
            .batch_write_cells(
                id,
                vec![UpdateCells {
                    start_row: 0,
                    start_column: 0,
                    rows: vec![vec![CellUpdate::text("y")]],
                }],
            )
            .await
            .unwrap();

        let read = store.read_range("Cal", &"A1".parse().unwrap()).await.unwrap();
        assert_eq!(read, values(&[&["y"]]));
        assert_eq!(store.writes().await.len(), 1);
        assert!(store.read_range("Nope", &"A1".parse().unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn write_to_unknown_sheet_is_not_recorded() {
        let store = MemoryStore::new(Workbook::default());
        let err = store.batch_write_cells(7, vec![]).await.unwrap_err();
        assert_eq!(err.kind(), crate::engine::ErrorKind::Io);
        assert!(store.writes().await.is_empty());
    }
}
