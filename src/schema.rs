//! Column model, type resolution, and YAML persistence.
//!
//! [`ColumnType`] is the closed set of types a column can take. The classifier
//! uses the same enum for the per-cell tags it observes, and
//! [`resolve_column_type`] collapses those tags into the single type recorded
//! in a [`Schema`]. Once built, a schema is only ever borrowed by the loader.

use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result, anyhow, ensure};
use serde::{Deserialize, Serialize};

use crate::classify::TagSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["integer", "float", "text"]
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "integer" | "int" | "bigint" => Ok(ColumnType::Integer),
            "float" | "double" | "real" | "decimal" => Ok(ColumnType::Float),
            "text" | "string" | "varchar" => Ok(ColumnType::Text),
            _ => Err(anyhow!(
                "Unknown column type '{value}'. Supported types: {}",
                ColumnType::variants().join(", ")
            )),
        }
    }
}

/// Collapses observed tags into one type: text beats float beats integer.
///
/// A column that never saw a value (header-only input) falls back to
/// [`ColumnType::Text`], which every backend can store.
pub fn resolve_column_type(tags: TagSet) -> ColumnType {
    if tags.contains(ColumnType::Text) {
        ColumnType::Text
    } else if tags.contains(ColumnType::Float) {
        ColumnType::Float
    } else if tags.contains(ColumnType::Integer) {
        ColumnType::Integer
    } else {
        ColumnType::Text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub datatype: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, datatype: ColumnType) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnMeta>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self { columns }
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.datatype)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn validate_headers(&self, headers: &[String]) -> Result<()> {
        ensure!(
            headers.len() == self.columns.len(),
            "Header length mismatch: schema expects {} column(s) but file contains {}",
            self.columns.len(),
            headers.len()
        );
        for (idx, (column, header)) in self.columns.iter().zip(headers).enumerate() {
            ensure!(
                column.name == *header,
                "Header mismatch at position {}: expected '{}' but found '{}'",
                idx + 1,
                column.name,
                header
            );
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing schema YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: Schema = serde_yaml::from_reader(reader).context("Parsing schema YAML")?;
        ensure!(!schema.is_empty(), "Schema file {path:?} defines no columns");
        Ok(schema)
    }
}
