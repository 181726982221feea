//! Cost to avoid evictions: the monthly rent needed to support a share of
//! burdened households, split across the housing stock by bedroom count.

use std::str::FromStr;

use log::info;
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::{Deserialize, Serialize};

use crate::{
    config::CostConfig,
    error::{Result, ScoreError},
    table::{FeatureTable, Geography, key_columns},
};

/// National housing stock shares for 0, 1, 2, 3 and 4+ bedroom units.
pub const HOUSING_STOCK_DISTRIBUTION: [f64; 5] = [0.0079, 0.1083, 0.2466, 0.4083, 0.2289];

pub const TOTAL_COST: &str = "total_cost";

/// Which rent schedule prices each bedroom count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RentType {
    /// Fair Market Rent, columns `fmr_0..fmr_4`.
    #[default]
    #[serde(rename = "fmr")]
    FairMarket,
    /// Median rent, columns `rent50_0..rent50_4`.
    #[serde(rename = "rent50")]
    Median,
}

impl RentType {
    pub fn column_prefix(&self) -> &'static str {
        match self {
            RentType::FairMarket => "fmr",
            RentType::Median => "rent50",
        }
    }

    /// Rent column for a bedroom count, e.g. `fmr_2`.
    pub fn column(&self, bedrooms: usize) -> String {
        format!("{}_{bedrooms}", self.column_prefix())
    }
}

impl FromStr for RentType {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fmr" | "fair-market" => Ok(RentType::FairMarket),
            "rent50" | "median" => Ok(RentType::Median),
            other => Err(ScoreError::invalid("rent_type", format!("expected fmr or rent50, got '{other}'"))),
        }
    }
}

impl std::fmt::Display for RentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_prefix())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeographyCost {
    pub geography: Geography,
    pub bedroom_costs: [f64; 5],
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct CostEstimate {
    rent_type: RentType,
    rows: Vec<GeographyCost>,
}

impl CostEstimate {
    #[inline] pub fn rent_type(&self) -> RentType { self.rent_type }

    #[inline] pub fn rows(&self) -> &[GeographyCost] { &self.rows }

    /// Sum of `total_cost` over every geography.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.total).sum()
    }

    /// Key columns, `br_cost_0..br_cost_4`, then `total_cost`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = key_columns(self.rows.iter().map(|row| &row.geography));
        for b in 0..5 {
            let values: Vec<f64> = self.rows.iter().map(|row| row.bedroom_costs[b]).collect();
            columns.push(Series::new(format!("br_cost_{b}").into(), values).into());
        }
        let totals: Vec<f64> = self.rows.iter().map(|row| row.total).collect();
        columns.push(Series::new(TOTAL_COST.into(), totals).into());
        Ok(DataFrame::new(columns)?)
    }
}

fn validate(config: &CostConfig) -> Result<()> {
    if !(0.0..=100.0).contains(&config.percent_burdened) {
        return Err(ScoreError::invalid("percent_burdened", format!(
            "must be within [0, 100], got {}", config.percent_burdened,
        )));
    }
    if config.distribution.iter().any(|share| !share.is_finite() || *share < 0.0) {
        return Err(ScoreError::invalid("distribution", format!(
            "shares must be non-negative, got {:?}", config.distribution,
        )));
    }
    if config.population_multiplier.is_nan() || config.population_multiplier <= 0.0 {
        return Err(ScoreError::invalid("population_multiplier", format!(
            "must be positive, got {}", config.population_multiplier,
        )));
    }
    Ok(())
}

/// Monthly cost of covering rent for `percent_burdened` percent of the
/// rent-burdened population of each geography.
///
/// `table` must carry the population, burdened-household percentage and the
/// five rent columns of the configured rent type.
pub fn estimate_eviction_cost(table: &FeatureTable, config: &CostConfig) -> Result<CostEstimate> {
    validate(config)?;
    if table.is_empty() { return Err(ScoreError::EmptyTable) }

    let population = table.indicator(&config.population_column)?;
    let burdened = table.indicator(&config.burdened_column)?;
    let rents = (0..5)
        .map(|b| table.indicator(&config.rent_type.column(b)))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let support = config.percent_burdened / 100.0;
    let rows = table.geographies().iter().enumerate()
        .map(|(row, geography)| {
            let households = population[row] * config.population_multiplier * burdened[row] / 100.0;
            let bedroom_costs: [f64; 5] = std::array::from_fn(|b| {
                config.distribution[b] * rents[b][row] * support * households
            });
            GeographyCost { geography: geography.clone(), total: bedroom_costs.iter().sum(), bedroom_costs }
        })
        .collect::<Vec<_>>();

    let estimate = CostEstimate { rent_type: config.rent_type, rows };
    info!("[cost] {} rent estimate for {} geographies: {:.0}", config.rent_type, estimate.rows.len(), estimate.total());
    Ok(estimate)
}
