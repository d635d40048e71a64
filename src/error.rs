use thiserror::Error;

use crate::{schema::ColumnType, source::RecordError};

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported database URL '{0}' (expected postgres://, postgresql:// or sqlite:)")]
    UnsupportedUrl(String),
    #[error("no schema has been created for this sink")]
    NotPrepared,
    #[error("sink is closed")]
    Closed,
}

/// Why a single row could not be committed.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("column '{column}' expects {expected} but found '{value}'")]
    Coercion {
        column: String,
        expected: ColumnType,
        value: String,
    },
    #[error("expected {expected} field(s) but found {found}")]
    Arity { expected: usize, found: usize },
    #[error(transparent)]
    Malformed(#[from] RecordError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
