//! Schemaless backend: one JSON Lines file per collection.
//!
//! Documents are appended to `<root>/<collection>.jsonl`, so repeated runs
//! accumulate like inserts into an existing collection.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::SinkError;

use super::{Document, DocumentSink};

pub struct JsonLinesStore {
    root: PathBuf,
    writers: HashMap<String, BufWriter<File>>,
}

impl JsonLinesStore {
    pub fn open(root: &Path) -> Result<Self, SinkError> {
        fs::create_dir_all(root)?;
        debug!("Document store rooted at {root:?}");
        Ok(Self {
            root: root.to_path_buf(),
            writers: HashMap::new(),
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.jsonl"))
    }
}

impl DocumentSink for JsonLinesStore {
    fn insert_document(&mut self, collection: &str, document: &Document) -> Result<(), SinkError> {
        let path = self.collection_path(collection);
        let writer = match self.writers.entry(collection.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new().create(true).append(true).open(&path)?;
                entry.insert(BufWriter::new(file))
            }
        };
        let mut line = serde_json::to_vec(document)?;
        line.push(b'\n');
        writer.write_all(&line)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        self.writers.clear();
        Ok(())
    }
}
