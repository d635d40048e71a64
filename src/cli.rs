use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Infer column types from a delimited file and load its rows into a database",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub dump: DumpArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DumpArgs {
    /// Delimited file to read; the first row names the columns
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,
    /// Backend to load into
    #[arg(short = 't', long = "type", value_enum)]
    pub backend: BackendKind,
    /// Table or collection name (defaults to the file stem in snake_case)
    #[arg(long)]
    pub table: Option<String>,
    /// Connection URL for the sql backend (postgres://... or sqlite:...)
    #[arg(
        long = "database-url",
        env = "CSV_DUMP_DATABASE_URL",
        default_value = "sqlite://csv_dump.db?mode=rwc"
    )]
    pub database_url: String,
    /// Directory holding collections for the document backend
    #[arg(
        long = "document-dir",
        env = "CSV_DUMP_DOCUMENT_DIR",
        default_value = "documents"
    )]
    pub document_dir: PathBuf,
    /// Number of rows to sample when inferring types (0 means full scan)
    #[arg(long, default_value_t = 0)]
    pub sample_rows: usize,
    /// Use column types from this YAML schema instead of inferring them
    #[arg(long = "schema")]
    pub schema: Option<PathBuf>,
    /// Write the resolved column types to this YAML file
    #[arg(long = "emit-schema")]
    pub emit_schema: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Relational table (PostgreSQL or SQLite, chosen by --database-url)
    Sql,
    /// Schemaless JSON Lines collection written to <document-dir>/<name>.jsonl
    Document,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
