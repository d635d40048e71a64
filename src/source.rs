//! Delimited input as a restartable stream of string records.
//!
//! A [`DelimitedSource`] only remembers where the file is and how to decode
//! it. Every call to [`DelimitedSource::open`] starts a fresh pass from the
//! first data row, which is how the classification and load passes share one
//! input.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use encoding_rs::Encoding;
use thiserror::Error;

use crate::io_utils;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O failure while reading row {row}: {source}")]
    Io { row: usize, source: csv::Error },
    #[error("row {row} is malformed: {source}")]
    Malformed { row: usize, source: csv::Error },
    #[error("row {row} is not valid {encoding}")]
    Decode { row: usize, encoding: &'static str },
}

impl RecordError {
    /// Whether the stream can continue past this record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecordError::Io { .. })
    }
}

#[derive(Debug, Clone)]
pub struct DelimitedSource {
    path: PathBuf,
    delimiter: u8,
    encoding: &'static Encoding,
}

impl DelimitedSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8, encoding: &'static Encoding) -> Self {
        Self {
            path: path.into(),
            delimiter,
            encoding,
        }
    }

    /// Resolves delimiter and encoding the same way the command line does.
    pub fn from_path(
        path: impl Into<PathBuf>,
        delimiter: Option<u8>,
        encoding_label: Option<&str>,
    ) -> Result<Self> {
        let path = path.into();
        let delimiter = io_utils::resolve_input_delimiter(&path, delimiter);
        let encoding = io_utils::resolve_encoding(encoding_label)?;
        Ok(Self::new(path, delimiter, encoding))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn open(&self) -> Result<RecordStream> {
        let mut reader = io_utils::open_csv_reader_from_path(&self.path, self.delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, self.encoding)?;
        if headers.is_empty() {
            bail!("{:?} has no header row", self.path);
        }
        Ok(RecordStream {
            reader,
            headers,
            encoding: self.encoding,
            record: csv::ByteRecord::new(),
            row: 0,
        })
    }
}

/// One pass over the data rows of a [`DelimitedSource`].
pub struct RecordStream {
    reader: csv::Reader<BufReader<File>>,
    headers: Vec<String>,
    encoding: &'static Encoding,
    record: csv::ByteRecord,
    row: usize,
}

impl RecordStream {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for RecordStream {
    type Item = Result<Vec<String>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let outcome = self.reader.read_byte_record(&mut self.record);
        let row = self.row + 1;
        match outcome {
            Ok(false) => None,
            Ok(true) => {
                self.row = row;
                Some(
                    io_utils::decode_record(&self.record, self.encoding).ok_or(
                        RecordError::Decode {
                            row,
                            encoding: self.encoding.name(),
                        },
                    ),
                )
            }
            Err(source) if source.is_io_error() => Some(Err(RecordError::Io { row, source })),
            Err(source) => {
                self.row = row;
                Some(Err(RecordError::Malformed { row, source }))
            }
        }
    }
}
