pub mod correlate;
pub mod cost;
pub mod equity;
pub mod rank;
pub mod transport;

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::LevelFilter;
use openequity::{AnalysisConfig, FeatureTable, GeoId, GeoType, TableSchema, io};
use polars::frame::DataFrame;

use crate::cli::Cli;

/// `RUST_LOG` wins when set; otherwise `-v` raises the default filter.
pub fn init_logging(verbose: u8) {
    if std::env::var_os("RUST_LOG").is_some() {
        pretty_env_logger::init();
        return;
    }
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder().filter_level(level).init();
}

pub fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("[config] Failed to load configuration from {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Read a table and apply the global selection filters.
pub fn load_table(cli: &Cli, path: &Path, schema: &TableSchema) -> Result<FeatureTable> {
    let mut table = io::read_table(path, schema)
        .with_context(|| format!("[load] Failed to load table from {}", path.display()))?;

    if let Some(state) = &cli.state {
        table = table.in_state(state)?;
    }
    if let Some(parent) = &cli.within {
        table = table.within(&parent_id(parent)?)?;
    }
    if !cli.names.is_empty() {
        table = table.with_names(&cli.names)?;
    }
    if table.is_empty() {
        bail!("[load] No geographies in {} match the selection", path.display());
    }

    log::info!("[load] selected {} {}s from {}", table.len(), table.geo_type(), path.display());
    Ok(table)
}

/// Parent geography from the length of its id.
fn parent_id(id: &str) -> Result<GeoId> {
    let ty = match id.trim().len() {
        2 => GeoType::State,
        5 => GeoType::County,
        11 => GeoType::Tract,
        n => bail!("[load] '{id}' is not a state (2), county (5) or tract (11) id; found {n} characters"),
    };
    Ok(GeoId::new(ty, id.trim()))
}

/// Write `frame` to `output`, or to stdout as CSV.
pub fn write_output(mut frame: DataFrame, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => io::write_csv(&mut frame, path)
            .with_context(|| format!("[output] Failed to write {}", path.display())),
        None => {
            print!("{}", io::write_csv_string(&mut frame)?);
            Ok(())
        }
    }
}
