//! Translation of resolved column types into SQL for a concrete dialect.

use std::{fmt, path::Path};

use heck::ToSnakeCase;
use itertools::Itertools;

use crate::{
    error::SinkError,
    schema::{ColumnType, Schema},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    Sqlite,
}

impl SqlDialect {
    pub fn from_url(url: &str) -> Result<Self, SinkError> {
        let lowered = url.trim().to_ascii_lowercase();
        if lowered.starts_with("postgres://") || lowered.starts_with("postgresql://") {
            Ok(SqlDialect::Postgres)
        } else if lowered.starts_with("sqlite:") {
            Ok(SqlDialect::Sqlite)
        } else {
            Err(SinkError::UnsupportedUrl(url.to_string()))
        }
    }

    pub fn type_keyword(self, datatype: ColumnType) -> &'static str {
        match (self, datatype) {
            (SqlDialect::Postgres, ColumnType::Integer) => "BIGINT",
            (SqlDialect::Postgres, ColumnType::Float) => "DOUBLE PRECISION",
            (SqlDialect::Postgres, ColumnType::Text) => "TEXT",
            (SqlDialect::Sqlite, ColumnType::Integer) => "INTEGER",
            (SqlDialect::Sqlite, ColumnType::Float) => "REAL",
            (SqlDialect::Sqlite, ColumnType::Text) => "TEXT",
        }
    }

    /// Bind placeholder for the 1-based parameter `position`.
    pub fn placeholder(self, position: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${position}"),
            SqlDialect::Sqlite => "?".to_string(),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Postgres => f.write_str("PostgreSQL"),
            SqlDialect::Sqlite => f.write_str("SQLite"),
        }
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Default table or collection name for an input file: its stem in snake_case.
pub fn table_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_snake_case())
        .unwrap_or_default();
    if stem.is_empty() {
        "csv_dump".to_string()
    } else {
        stem
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_keyword: &'static str,
}

/// A table bound to one dialect: column names paired with native type keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub dialect: SqlDialect,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, schema: &Schema, dialect: SqlDialect) -> Self {
        let columns = schema
            .columns
            .iter()
            .map(|column| ColumnDefinition {
                name: column.name.clone(),
                type_keyword: dialect.type_keyword(column.datatype),
            })
            .collect();
        Self {
            table: table.into(),
            dialect,
            columns,
        }
    }

    pub fn create_statement(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(&self.table),
            self.columns
                .iter()
                .map(|c| format!("{} {}", quote_identifier(&c.name), c.type_keyword))
                .join(", ")
        )
    }

    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table),
            self.columns
                .iter()
                .map(|c| quote_identifier(&c.name))
                .join(", "),
            (1..=self.columns.len())
                .map(|position| self.dialect.placeholder(position))
                .join(", ")
        )
    }
}
