use std::collections::HashSet;

use log::debug;
use polars::{
    lazy::dsl::pearson_corr,
    prelude::{Column, DataFrame, DataType, Expr, IntoLazy, NamedFrom, Series, col},
};

use crate::{error::{Result, ScoreError}, table::FeatureTable};

/// Name of the row-label column of a correlation matrix.
pub const INDICATOR: &str = "Indicator";

/// Pearson correlation between every pair of `indicators` over the rows of
/// `table`.
///
/// The frame leads with an `Indicator` column naming each row, followed by
/// one `f64` column per indicator in the same order, so it is symmetric with
/// 1 on the diagonal. An indicator that is constant over the selection has no
/// defined correlation and is NaN against everything, itself included.
pub fn correlate<S: AsRef<str>>(table: &FeatureTable, indicators: &[S]) -> Result<DataFrame> {
    if indicators.is_empty() {
        return Err(ScoreError::invalid("indicators", "at least one indicator is required"));
    }
    if table.len() < 2 {
        return Err(ScoreError::invalid("table", format!(
            "correlation needs at least two geographies, got {}", table.len(),
        )));
    }

    let names: Vec<&str> = indicators.iter().map(AsRef::as_ref).collect();
    let mut seen = HashSet::new();
    if let Some(repeat) = names.iter().find(|name| !seen.insert(**name)) {
        return Err(ScoreError::invalid("indicators", format!("'{repeat}' is listed twice")));
    }

    // Positional aliases keep arbitrary indicator names out of expressions.
    let values = names.iter().enumerate()
        .map(|(i, name)| Ok(Series::new(format!("x{i}").into(), table.indicator(name)?).into()))
        .collect::<Result<Vec<Column>>>()?;

    let n = names.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();
    let exprs: Vec<Expr> = pairs.iter()
        .map(|&(i, j)| pearson_corr(col(format!("x{i}")), col(format!("x{j}"))).alias(format!("r{i}_{j}")))
        .collect();
    let coefficients = DataFrame::new(values)?.lazy().select(exprs).collect()?;

    let mut matrix = vec![vec![f64::NAN; n]; n];
    for &(i, j) in &pairs {
        let r = coefficients.column(&format!("r{i}_{j}"))?.cast(&DataType::Float64)?;
        let r = r.f64()?.get(0).unwrap_or(f64::NAN);
        matrix[i][j] = r;
        matrix[j][i] = r;
    }
    debug!("[correlate] {n} indicators over {} {}s", table.len(), table.geo_type());

    let mut columns: Vec<Column> = Vec::with_capacity(n + 1);
    columns.push(Series::new(INDICATOR.into(), names.clone()).into());
    for (j, name) in names.iter().enumerate() {
        let values: Vec<f64> = matrix.iter().map(|row| row[j]).collect();
        columns.push(Series::new((*name).into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Every numeric indicator column of `table`, in column order.
pub fn numeric_indicators(table: &FeatureTable) -> Vec<String> {
    table.data().get_columns().iter()
        .filter(|column| column.dtype().is_primitive_numeric())
        .map(|column| column.name().to_string())
        .collect()
}
