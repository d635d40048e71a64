//! Second pass: stream rows into a sink and account for every one of them.
//!
//! A failing row is logged, counted, and skipped; only an I/O failure on the
//! input ends the pass early. The sink is finished on every exit path.

use std::{
    fmt,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{error::RowError, schema::Schema, sink::Sink, source::DelimitedSource};

const PROGRESS_INTERVAL: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub elapsed: Duration,
    pub rows_seen: usize,
    pub rows_committed: usize,
    pub rows_failed: usize,
}

impl LoadStats {
    fn record(&mut self, outcome: &Result<(), RowError>) {
        self.rows_seen += 1;
        match outcome {
            Ok(()) => self.rows_committed += 1,
            Err(err) => {
                self.rows_failed += 1;
                warn!("Error inserting row {}: {err}", self.rows_seen);
            }
        }
    }
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time elapsed: {:.2} seconds", self.elapsed.as_secs_f64())?;
        writeln!(f, "Total rows processed: {}", self.rows_seen)?;
        writeln!(f, "Total rows added: {}", self.rows_committed)?;
        write!(f, "Total errors encountered: {}", self.rows_failed)
    }
}

/// Loads every data row of `source` into `sink` using the resolved `schema`.
///
/// The schema must already have been created on the sink.
pub fn load(source: &DelimitedSource, schema: &Schema, sink: &mut Sink) -> Result<LoadStats> {
    let started = Instant::now();
    let mut stats = LoadStats::default();
    let outcome = load_rows(source, schema, sink, &mut stats);
    let released = sink.finish();
    outcome?;
    released.context("Releasing sink")?;
    stats.elapsed = started.elapsed();
    Ok(stats)
}

fn load_rows(
    source: &DelimitedSource,
    schema: &Schema,
    sink: &mut Sink,
    stats: &mut LoadStats,
) -> Result<()> {
    let stream = source
        .open()
        .with_context(|| format!("Opening {:?} for loading", source.path()))?;
    schema
        .validate_headers(stream.headers())
        .with_context(|| format!("Validating headers for {:?}", source.path()))?;

    for record in stream {
        let outcome = match record {
            Err(err) if err.is_fatal() => {
                return Err(err).with_context(|| format!("Loading {:?}", source.path()));
            }
            Err(err) => Err(RowError::from(err)),
            Ok(row) => {
                debug!("Inserting row {}", stats.rows_seen + 1);
                sink.insert_row(schema, &row)
            }
        };
        stats.record(&outcome);
        if stats.rows_seen % PROGRESS_INTERVAL == 0 {
            info!(
                "Processed {} row(s): {} added, {} failed",
                stats.rows_seen, stats.rows_committed, stats.rows_failed
            );
        }
    }
    Ok(())
}
