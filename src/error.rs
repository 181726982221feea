use polars::error::PolarsError;
use thiserror::Error;

/// Errors raised by the scoring core.
///
/// Messages always name the indicator and, where one is involved, the
/// geography, since sparse census coverage is the usual cause of a failed run.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("selected geographies have no data for indicator '{column}'")]
    MissingColumn { column: String },

    #[error("{geography} has no value for indicator '{column}'")]
    MissingValue { column: String, geography: String },

    #[error("indicator '{column}' is not numeric (found {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    #[error("geography {geo_id} appears more than once in the table")]
    DuplicateGeography { geo_id: String },

    #[error("{geography} is not present in the joined table")]
    UnmatchedGeography { geography: String },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("table contains no geographies")]
    EmptyTable,

    #[error("[io::csv] failed to {action} {path}")]
    File { action: &'static str, path: String, #[source] source: std::io::Error },

    #[error("[io::csv] failed to {action} {path}")]
    Csv { action: &'static str, path: String, #[source] source: PolarsError },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ScoreError {
    pub(crate) fn missing_column(column: &str) -> Self {
        Self::MissingColumn { column: column.to_string() }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { name, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
