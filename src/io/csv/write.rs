//! CSV writing operations.

use std::{fs::File, path::Path};

use log::info;
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};

use crate::error::{Result, ScoreError};

/// Write a DataFrame to a CSV file.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| ScoreError::File {
        action: "create",
        path: path.display().to_string(),
        source,
    })?;
    CsvWriter::new(file)
        .finish(df)
        .map_err(|source| ScoreError::Csv { action: "write", path: path.display().to_string(), source })?;

    info!("[io::csv::write] wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Write a DataFrame to a CSV string.
pub fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .map_err(|source| ScoreError::Csv { action: "write", path: "<string>".into(), source })?;
    Ok(String::from_utf8(buffer)?)
}
