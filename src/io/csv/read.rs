//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path, sync::Arc};

use log::debug;
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, DataType, Field, Schema, SchemaRef}};

use crate::{config::TableSchema, error::{Result, ScoreError}, table::FeatureTable};

/// Reads a CSV file from `path` into a Polars DataFrame.
///
/// The id column of `schema` is read as a string to keep leading zeros.
pub fn read_csv(path: &Path, schema: &TableSchema) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| ScoreError::File {
        action: "open",
        path: path.display().to_string(),
        source,
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(key_schema(schema)))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|source| ScoreError::Csv { action: "read", path: path.display().to_string(), source })?;

    debug!("[io::csv::read] read {} rows x {} columns from {}", df.height(), df.width(), path.display());
    Ok(df)
}

/// Reads a CSV from a string.
pub fn read_csv_string(csv: &str, schema: &TableSchema) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(key_schema(schema)))
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes()))
        .finish()
        .map_err(|source| ScoreError::Csv { action: "read", path: "<string>".into(), source })
}

/// Reads a CSV file straight into a `FeatureTable`.
pub fn read_table(path: &Path, schema: &TableSchema) -> Result<FeatureTable> {
    FeatureTable::from_frame(read_csv(path, schema)?, schema)
}

/// Schema overwrite forcing the id column to a string.
fn key_schema(schema: &TableSchema) -> SchemaRef {
    Arc::new(Schema::from_iter([
        Field::new(schema.id_column.as_str().into(), DataType::String),
    ]))
}
