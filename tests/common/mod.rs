#![allow(dead_code)]

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use csv_dump::coerce::SqlValue;
use csv_dump::ddl::{ColumnDefinition, SqlDialect, TableSchema};
use csv_dump::error::SinkError;
use csv_dump::sink::{Document, DocumentSink, TableSink};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// SQLite URL for a database file inside the workspace.
    pub fn sqlite_url(&self, name: &str) -> String {
        format!("sqlite://{}?mode=rwc", self.path().join(name).display())
    }
}

#[derive(Debug, Default)]
pub struct TableState {
    pub tables: BTreeMap<String, Vec<ColumnDefinition>>,
    pub rows: Vec<Vec<SqlValue>>,
    pub create_calls: usize,
    pub finished: bool,
    pub reject_text: Option<String>,
}

/// In-memory schema-first backend. Clones share state so a test can inspect
/// what the loader wrote after handing the sink over.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSink {
    state: Rc<RefCell<TableState>>,
}

impl MemoryTableSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any row carrying this exact text value.
    pub fn rejecting(text: &str) -> Self {
        let sink = Self::default();
        sink.state.borrow_mut().reject_text = Some(text.to_string());
        sink
    }

    pub fn state(&self) -> Ref<'_, TableState> {
        self.state.borrow()
    }
}

impl TableSink for MemoryTableSink {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn create_table(&mut self, table: &TableSchema) -> Result<(), SinkError> {
        let mut state = self.state.borrow_mut();
        state.create_calls += 1;
        state
            .tables
            .entry(table.table.clone())
            .or_insert_with(|| table.columns.clone());
        Ok(())
    }

    fn insert_row(&mut self, table: &TableSchema, values: &[SqlValue]) -> Result<(), SinkError> {
        let mut state = self.state.borrow_mut();
        if !state.tables.contains_key(&table.table) {
            return Err(SinkError::NotPrepared);
        }
        if let Some(reject) = &state.reject_text {
            if values
                .iter()
                .any(|v| matches!(v, SqlValue::Text(text) if text == reject))
            {
                return Err(SinkError::Io(io::Error::other(format!(
                    "value '{reject}' rejected"
                ))));
            }
        }
        state.rows.push(values.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.state.borrow_mut().finished = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DocumentState {
    pub documents: Vec<(String, Document)>,
    pub finished: bool,
    pub reject_text: Option<String>,
}

/// In-memory schemaless backend with shared, inspectable state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentSink {
    state: Rc<RefCell<DocumentState>>,
}

impl MemoryDocumentSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any document carrying this exact field value.
    pub fn rejecting(text: &str) -> Self {
        let sink = Self::default();
        sink.state.borrow_mut().reject_text = Some(text.to_string());
        sink
    }

    pub fn state(&self) -> Ref<'_, DocumentState> {
        self.state.borrow()
    }
}

impl DocumentSink for MemoryDocumentSink {
    fn insert_document(&mut self, collection: &str, document: &Document) -> Result<(), SinkError> {
        let mut state = self.state.borrow_mut();
        if let Some(reject) = &state.reject_text {
            if document.values().any(|value| value.as_str() == Some(reject.as_str())) {
                return Err(SinkError::Io(io::Error::other(format!(
                    "document with '{reject}' rejected"
                ))));
            }
        }
        state
            .documents
            .push((collection.to_string(), document.clone()));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.state.borrow_mut().finished = true;
        Ok(())
    }
}
