//! Storage backends the loader writes into.
//!
//! A backend is either schema-first ([`TableSink`]: the table must exist
//! before rows arrive, and every row is coerced to the resolved column types)
//! or schemaless ([`DocumentSink`]: each row becomes a self-describing
//! document of raw strings). [`Sink`] closes over the two so the loader talks
//! to a single capability, chosen once at startup.

pub mod jsonl;
pub mod sql;

use std::path::PathBuf;

use log::{debug, info};
use serde_json::Value;

use crate::{
    cli::BackendKind,
    coerce::{SqlValue, coerce_row},
    ddl::{SqlDialect, TableSchema},
    error::{RowError, SinkError},
    schema::Schema,
};

pub use jsonl::JsonLinesStore;
pub use sql::SqlTableSink;

pub type Document = serde_json::Map<String, Value>;

pub trait TableSink {
    fn dialect(&self) -> SqlDialect;

    /// Creates the table unless it already exists.
    fn create_table(&mut self, table: &TableSchema) -> Result<(), SinkError>;

    fn insert_row(&mut self, table: &TableSchema, values: &[SqlValue]) -> Result<(), SinkError>;

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

pub trait DocumentSink {
    fn insert_document(&mut self, collection: &str, document: &Document) -> Result<(), SinkError>;

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SinkSettings {
    pub database_url: String,
    pub document_dir: PathBuf,
}

pub enum Sink {
    SchemaFirst {
        sink: Box<dyn TableSink>,
        table: Option<TableSchema>,
    },
    Schemaless {
        sink: Box<dyn DocumentSink>,
        collection: Option<String>,
    },
}

impl Sink {
    pub fn schema_first(sink: impl TableSink + 'static) -> Self {
        Sink::SchemaFirst {
            sink: Box::new(sink),
            table: None,
        }
    }

    pub fn schemaless(sink: impl DocumentSink + 'static) -> Self {
        Sink::Schemaless {
            sink: Box::new(sink),
            collection: None,
        }
    }

    /// Opens the backend selected on the command line.
    pub fn connect(backend: BackendKind, settings: &SinkSettings) -> Result<Self, SinkError> {
        match backend {
            BackendKind::Sql => Ok(Sink::schema_first(SqlTableSink::connect(
                &settings.database_url,
            )?)),
            BackendKind::Document => Ok(Sink::schemaless(JsonLinesStore::open(
                &settings.document_dir,
            )?)),
        }
    }

    /// Prepares `name` to receive rows shaped like `schema`.
    ///
    /// Schema-first backends run an idempotent `CREATE TABLE IF NOT EXISTS`;
    /// schemaless backends only remember the collection name.
    pub fn create_schema(&mut self, name: &str, schema: &Schema) -> Result<(), SinkError> {
        match self {
            Sink::SchemaFirst { sink, table } => {
                let definition = TableSchema::new(name, schema, sink.dialect());
                debug!("{}", definition.create_statement());
                sink.create_table(&definition)?;
                info!(
                    "Table '{}' ready with {} column(s)",
                    definition.table,
                    definition.columns.len()
                );
                *table = Some(definition);
            }
            Sink::Schemaless { collection, .. } => {
                debug!("Collection '{name}' needs no schema");
                *collection = Some(name.to_string());
            }
        }
        Ok(())
    }

    pub fn insert_row(&mut self, schema: &Schema, row: &[String]) -> Result<(), RowError> {
        match self {
            Sink::SchemaFirst { sink, table } => {
                let table = table.as_ref().ok_or(SinkError::NotPrepared)?;
                let values = coerce_row(schema, row)?;
                sink.insert_row(table, &values)?;
            }
            Sink::Schemaless { sink, collection } => {
                let collection = collection.as_deref().ok_or(SinkError::NotPrepared)?;
                if row.len() != schema.len() {
                    return Err(RowError::Arity {
                        expected: schema.len(),
                        found: row.len(),
                    });
                }
                let document: Document = schema
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.name.clone(), Value::String(cell.clone())))
                    .collect();
                sink.insert_document(collection, &document)?;
            }
        }
        Ok(())
    }

    /// Flushes and releases the backend.
    pub fn finish(&mut self) -> Result<(), SinkError> {
        match self {
            Sink::SchemaFirst { sink, .. } => sink.finish(),
            Sink::Schemaless { sink, .. } => sink.finish(),
        }
    }
}
