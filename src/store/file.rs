use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::a1::CellRange;
use crate::engine::EngineError;
use crate::render::wire::UpdateCells;

use super::{GridStore, SheetId, Workbook};

/// A JSON workbook on disk (`{"sheets":[{"id","name","values"}]}`).
///
/// Each batch is applied to the cell values and the file is rewritten through a
/// temp file and rename, so a crash leaves either the old or the new workbook.
/// When a journal path is set, every batch is also appended to it as one JSON
/// line carrying the full formatted requests.
pub struct WorkbookFile {
    path: PathBuf,
    journal: Option<PathBuf>,
    workbook: Mutex<Workbook>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JournalEntry<'a> {
    sheet_id: SheetId,
    requests: &'a [UpdateCells],
}

impl WorkbookFile {
    pub fn open(path: &Path, journal: Option<PathBuf>) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let workbook: Workbook =
            serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        info!("opened workbook {} ({} sheets)", path.display(), workbook.sheets.len());
        Ok(Self {
            path: path.to_path_buf(),
            journal,
            workbook: Mutex::new(workbook),
        })
    }

    /// Write `workbook` to `path` via `<path>.tmp` + rename.
    pub fn save(path: &Path, workbook: &Workbook) -> io::Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, workbook)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp_path, path)
    }

    fn append_journal(path: &Path, sheet: SheetId, requests: &[UpdateCells]) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &JournalEntry { sheet_id: sheet, requests })
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

fn io_err(e: io::Error) -> EngineError {
    EngineError::Store(e.to_string())
}

#[async_trait]
impl GridStore for WorkbookFile {
    async fn read_range(&self, sheet: &str, range: &CellRange) -> Result<Vec<Vec<String>>, EngineError> {
        let workbook = self.workbook.lock().await;
        Ok(workbook.sheet(sheet)?.read(range))
    }

    async fn sheet_id(&self, sheet: &str) -> Result<SheetId, EngineError> {
        Ok(self.workbook.lock().await.sheet(sheet)?.id)
    }

    async fn batch_write_cells(&self, sheet: SheetId, requests: Vec<UpdateCells>) -> Result<(), EngineError> {
        let mut workbook = self.workbook.lock().await;
        workbook.apply(sheet, &requests)?;
        Self::save(&self.path, &workbook).map_err(io_err)?;
        if let Some(journal) = &self.journal {
            Self::append_journal(journal, sheet, &requests).map_err(io_err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::wire::CellUpdate;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("hopecal_test_store").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn write_persists_and_journals() {
        let dir = test_dir("persist");
        let path = dir.join("book.json");
        let journal = dir.join("requests.jsonl");

        let mut wb = Workbook::default();
        let id = wb.add_sheet("Cal", vec![vec!["old".into()]]);
        WorkbookFile::save(&path, &wb).unwrap();

        let store = WorkbookFile::open(&path, Some(journal.clone())).unwrap();
        assert_eq!(store.sheet_id("Cal").await.unwrap(), id);
        let request = UpdateCells {
            start_row: 0,
            start_column: 0,
            rows: vec![vec![CellUpdate::text("new")]],
        };
        store.batch_write_cells(id, vec![request.clone()]).await.unwrap();
        store.batch_write_cells(id, vec![request]).await.unwrap();

        // Reopen from disk
        let reopened = WorkbookFile::open(&path, None).unwrap();
        let read = reopened.read_range("Cal", &"A1".parse().unwrap()).await.unwrap();
        assert_eq!(read, vec![vec!["new".to_string()]]);
        assert!(!path.with_extension("json.tmp").exists());

        let lines: Vec<serde_json::Value> = fs::read_to_string(&journal)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["sheetId"], id);
        assert_eq!(lines[0]["requests"][0]["rows"][0][0]["userEnteredValue"]["stringValue"], "new");
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = test_dir("missing");
        assert!(WorkbookFile::open(&dir.join("nope.json"), None).is_err());
    }

    #[test]
    fn open_garbage_fails() {
        let dir = test_dir("garbage");
        let path = dir.join("bad.json");
        fs::write(&path, b"not json").unwrap();
        let err = WorkbookFile::open(&path, None).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn unknown_sheet_id_is_store_error() {
        let dir = test_dir("unknown_id");
        let path = dir.join("book.json");
        WorkbookFile::save(&path, &Workbook::default()).unwrap();
        let store = WorkbookFile::open(&path, None).unwrap();
        let err = store.batch_write_cells(42, vec![]).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }
}
