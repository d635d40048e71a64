pub mod classify;
pub mod cli;
pub mod coerce;
pub mod ddl;
pub mod dump;
pub mod error;
pub mod io_utils;
pub mod loader;
pub mod schema;
pub mod sink;
pub mod source;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_dump", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    dump::execute(&cli.dump)?;
    Ok(())
}
