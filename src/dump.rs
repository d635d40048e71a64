use anyhow::{Context, Result};
use log::info;

use crate::{
    classify,
    cli::DumpArgs,
    ddl,
    io_utils::printable_delimiter,
    loader::{self, LoadStats},
    schema::Schema,
    sink::{Sink, SinkSettings},
    source::DelimitedSource,
};

pub fn execute(args: &DumpArgs) -> Result<LoadStats> {
    let source =
        DelimitedSource::from_path(&args.file, args.delimiter, args.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}'",
        source.path().display(),
        printable_delimiter(source.delimiter())
    );

    let schema = resolve_schema(args, &source)?;
    for column in &schema.columns {
        info!("Column '{}' resolved to {}", column.name, column.datatype);
    }
    if let Some(path) = &args.emit_schema {
        schema
            .save(path)
            .with_context(|| format!("Writing schema to {path:?}"))?;
        info!("Schema for {} column(s) written to {path:?}", schema.len());
    }

    let name = args
        .table
        .clone()
        .unwrap_or_else(|| ddl::table_name_for(&args.file));
    let settings = SinkSettings {
        database_url: args.database_url.clone(),
        document_dir: args.document_dir.clone(),
    };
    let mut sink = Sink::connect(args.backend, &settings)
        .with_context(|| format!("Opening {:?} backend", args.backend))?;
    sink.create_schema(&name, &schema)
        .with_context(|| format!("Creating schema for '{name}'"))?;

    let stats = loader::load(&source, &schema, &mut sink)?;
    println!("Data loaded into '{name}'");
    println!("{stats}");
    Ok(stats)
}

fn resolve_schema(args: &DumpArgs, source: &DelimitedSource) -> Result<Schema> {
    match &args.schema {
        Some(path) => {
            let schema = Schema::load(path)
                .with_context(|| format!("Loading schema from {path:?}"))?;
            let stream = source.open()?;
            schema
                .validate_headers(stream.headers())
                .with_context(|| format!("Validating headers for {:?}", source.path()))?;
            info!("Using column types from {path:?}");
            Ok(schema)
        }
        None => Ok(classify::classify_source(source, args.sample_rows)?.into_schema()),
    }
}
