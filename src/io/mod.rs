//! IO for analysis tables.
//!
//! The scoring core never touches the filesystem itself; callers read a raw
//! table here, hand the resulting `FeatureTable` to a pipeline, and write the
//! output frame back out.
//!
//! # Format Modules
//!
//! - `csv` - CSV tables from the data layer, and exported rankings

pub mod csv;

pub use csv::{read_csv, read_csv_string, read_table, write_csv, write_csv_string};
