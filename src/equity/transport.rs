use std::collections::{BTreeMap, HashSet};

use log::{debug, info, warn};
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, ScoreError},
    score::{descending_order, min_max_scale, weighted_column_sum},
    table::{FeatureTable, Geography, key_columns},
};
use super::{classify::{Criteria, EquityGeographies}, stats::mean};

pub const INDEX_VALUE: &str = "Index Value";

/// Analyst-entered weight for one transportation indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorWeight {
    pub indicator: String,
    pub weight: u32,
}

/// Validated, ordered indicator weights.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportWeights {
    weights: Vec<IndicatorWeight>,
}

impl TransportWeights {
    /// Weights are meant to total 100. A total outside [99, 101] is logged
    /// but accepted.
    pub fn new(weights: Vec<IndicatorWeight>) -> Result<Self> {
        if weights.is_empty() {
            return Err(ScoreError::invalid("weights", "at least one indicator is required"));
        }
        let mut seen = HashSet::new();
        if let Some(repeat) = weights.iter().find(|w| !seen.insert(w.indicator.as_str())) {
            return Err(ScoreError::invalid("weights", format!("'{}' is weighted twice", repeat.indicator)));
        }

        let weights = Self { weights };
        if !weights.is_balanced() {
            warn!("[transport] indicator weights total {}, expected 100", weights.total());
        }
        Ok(weights)
    }

    #[inline] pub fn weights(&self) -> &[IndicatorWeight] { &self.weights }

    #[inline] pub fn total(&self) -> u64 { self.weights.iter().map(|w| u64::from(w.weight)).sum() }

    #[inline] pub fn is_balanced(&self) -> bool { (99..=101).contains(&self.total()) }

    pub fn indicators(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|w| w.indicator.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct IndexedTract {
    pub geography: Geography,
    /// Weighted min-max values, one per indicator.
    pub contributions: Vec<f64>,
    pub index_value: f64,
    /// Equity classification, when the index was joined with one.
    pub criteria: Option<Criteria>,
}

/// Tracts ranked by descending Index Value, ties in input order.
#[derive(Debug, Clone)]
pub struct TransportIndex {
    indicators: Vec<String>,
    rows: Vec<IndexedTract>,
}

impl TransportIndex {
    #[inline] pub fn indicators(&self) -> &[String] { &self.indicators }

    #[inline] pub fn rows(&self) -> &[IndexedTract] { &self.rows }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Keep the `n` highest-ranked tracts.
    pub fn top(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    /// Annotate each tract with its criteria from `equity`.
    pub fn with_equity(mut self, equity: &EquityGeographies) -> Self {
        for row in &mut self.rows {
            row.criteria = equity.get(&row.geography.geo_id).map(|tract| tract.criteria());
        }
        self
    }

    /// Key columns, weighted contributions, `Index Value`, and `Criteria`
    /// if any tract carries one.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = key_columns(self.rows.iter().map(|row| &row.geography));
        for (j, name) in self.indicators.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|row| row.contributions[j]).collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        let index: Vec<f64> = self.rows.iter().map(|row| row.index_value).collect();
        columns.push(Series::new(INDEX_VALUE.into(), index).into());

        if self.rows.iter().any(|row| row.criteria.is_some()) {
            let criteria: Vec<Option<&str>> = self.rows.iter()
                .map(|row| row.criteria.as_ref().map(Criteria::to_str))
                .collect();
            columns.push(Series::new("Criteria".into(), criteria).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Min-max normalize each weighted indicator over `tracts`, multiply by its
/// weight and sum into one Index Value per tract.
///
/// A constant indicator contributes 0 to every tract.
pub fn build_index(tracts: &FeatureTable, weights: &TransportWeights) -> Result<TransportIndex> {
    if tracts.is_empty() { return Err(ScoreError::EmptyTable) }

    let indicators: Vec<String> = weights.indicators().map(String::from).collect();
    let normalized = indicators.iter()
        .map(|indicator| {
            let scaled = min_max_scale(&tracts.indicator(indicator)?);
            if scaled.iter().all(|v| *v == 0.0) {
                debug!("[transport] '{indicator}' is constant over the selection");
            }
            Ok(scaled)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let factors: Vec<f64> = weights.weights().iter().map(|w| w.weight as f64).collect();
    let columns: Vec<&[f64]> = normalized.iter().map(Vec::as_slice).collect();
    let index = weighted_column_sum(&columns, &factors)?;

    let rows = descending_order(&index).into_iter()
        .map(|row| IndexedTract {
            geography: tracts.geographies()[row].clone(),
            contributions: normalized.iter().zip(&factors).map(|(column, w)| column[row] * w).collect(),
            index_value: index[row],
            criteria: None,
        })
        .collect::<Vec<_>>();

    info!("[transport] indexed {} tracts on {} indicators", rows.len(), indicators.len());
    Ok(TransportIndex { indicators, rows })
}

/// Selection-wide and Equity-Geography-only averages of transportation indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageComparison {
    pub selection: BTreeMap<String, f64>,
    /// Empty when no tract of the selection is an Equity Geography.
    pub equity: BTreeMap<String, f64>,
}

/// Compare indicator averages over `tracts` against the Equity Geographies in it.
pub fn compare_averages<S: AsRef<str>>(
    tracts: &FeatureTable,
    indicators: &[S],
    equity: &EquityGeographies,
) -> Result<AverageComparison> {
    let ids = equity.equity_ids();
    let in_equity: Vec<bool> = tracts.geographies().iter().map(|geo| ids.contains(&geo.geo_id)).collect();
    let any_equity = in_equity.iter().any(|&b| b);

    let mut selection = BTreeMap::new();
    let mut equity_averages = BTreeMap::new();
    for indicator in indicators {
        let indicator = indicator.as_ref();
        let values = tracts.indicator(indicator)?;
        selection.insert(indicator.to_string(), mean(&values));

        if any_equity {
            let subset: Vec<f64> = values.iter().zip(&in_equity)
                .filter_map(|(&value, &keep)| keep.then_some(value))
                .collect();
            equity_averages.insert(indicator.to_string(), mean(&subset));
        }
    }

    Ok(AverageComparison { selection, equity: equity_averages })
}
