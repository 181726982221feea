use std::{collections::{BTreeMap, HashSet}, str::FromStr};

use log::{debug, info};
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::{Deserialize, Serialize};

use crate::{
    config::EquityConfig,
    error::{Result, ScoreError},
    table::{FeatureTable, GeoId, Geography, key_columns},
};
use super::stats::{Threshold, mean};

/// Analyst-facing concentration level, mapped to the threshold coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concentration {
    Low,
    #[default]
    Medium,
    High,
}

impl Concentration {
    #[inline]
    pub fn coefficient(&self) -> f64 {
        match self {
            Concentration::Low => 0.5,
            Concentration::Medium => 1.0,
            Concentration::High => 1.5,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Concentration::Low => "low",
            Concentration::Medium => "medium",
            Concentration::High => "high",
        }
    }
}

impl FromStr for Concentration {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Concentration::Low),
            "medium" => Ok(Concentration::Medium),
            "high" => Ok(Concentration::High),
            other => Err(ScoreError::invalid("concentration", format!("expected low, medium or high, got '{other}'"))),
        }
    }
}

impl std::fmt::Display for Concentration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Which low-income indicator feeds both criteria.
///
/// Defaults to households below 200% of the poverty level, the measure the
/// MTC Equity Priority Community methodology uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PovertyMeasure {
    #[default]
    #[serde(rename = "below_200_percent")]
    Below200Percent,
    #[serde(rename = "below_poverty_level")]
    BelowPovertyLevel,
}

impl PovertyMeasure {
    pub fn indicator(&self) -> &'static str {
        match self {
            PovertyMeasure::Below200Percent => "200% Below Poverty Level",
            PovertyMeasure::BelowPovertyLevel => "Below Poverty Level",
        }
    }
}

/// Which criteria a tract meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criteria {
    Both,
    AOnly,
    BOnly,
    Other,
}

impl Criteria {
    pub fn new(criteria_a: bool, criteria_b: bool) -> Self {
        match (criteria_a, criteria_b) {
            (true, true) => Criteria::Both,
            (true, false) => Criteria::AOnly,
            (false, true) => Criteria::BOnly,
            (false, false) => Criteria::Other,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Criteria::Both => "Both",
            Criteria::AOnly => "Criteria A Only",
            Criteria::BOnly => "Criteria B Only",
            Criteria::Other => "Other",
        }
    }
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// One tract with its indicator values and concentration checks, in
/// `EquityGeographies::indicators` order.
#[derive(Debug, Clone)]
pub struct ClassifiedTract {
    pub geography: Geography,
    pub values: Vec<f64>,
    pub checks: Vec<bool>,
    pub criteria_a: bool,
    pub criteria_b: bool,
}

impl ClassifiedTract {
    #[inline] pub fn criteria(&self) -> Criteria { Criteria::new(self.criteria_a, self.criteria_b) }

    #[inline] pub fn is_equity_geography(&self) -> bool { self.criteria_a || self.criteria_b }

    pub fn designation(&self) -> &'static str {
        if self.is_equity_geography() { "Equity Geography" } else { "Other" }
    }
}

/// Every tract of a selection, labeled against thresholds computed over
/// that same selection for one coefficient.
#[derive(Debug, Clone)]
pub struct EquityGeographies {
    coefficient: f64,
    indicators: Vec<String>,
    columns: Vec<String>,
    tracts: Vec<ClassifiedTract>,
    thresholds: BTreeMap<String, f64>,
    averages: BTreeMap<String, f64>,
    equity_averages: BTreeMap<String, f64>,
    table: FeatureTable,
}

impl EquityGeographies {
    #[inline] pub fn coefficient(&self) -> f64 { self.coefficient }

    /// Indicator names: people of color, low income, then the remaining group.
    #[inline] pub fn indicators(&self) -> &[String] { &self.indicators }

    #[inline] pub fn tracts(&self) -> &[ClassifiedTract] { &self.tracts }

    #[inline] pub fn thresholds(&self) -> &BTreeMap<String, f64> { &self.thresholds }

    /// Per-indicator average over the whole selection, in percent.
    #[inline] pub fn averages(&self) -> &BTreeMap<String, f64> { &self.averages }

    /// Per-indicator average over Equity Geographies only. Empty if none qualify.
    #[inline] pub fn equity_averages(&self) -> &BTreeMap<String, f64> { &self.equity_averages }

    pub fn get(&self, geo_id: &GeoId) -> Option<&ClassifiedTract> {
        self.tracts.iter().find(|tract| tract.geography.geo_id == *geo_id)
    }

    pub fn equity_tracts(&self) -> impl Iterator<Item = &ClassifiedTract> {
        self.tracts.iter().filter(|tract| tract.is_equity_geography())
    }

    pub fn equity_ids(&self) -> HashSet<GeoId> {
        self.equity_tracts().map(|tract| tract.geography.geo_id.clone()).collect()
    }

    /// The qualifying tracts as a new table with every source column.
    pub fn equity_subset(&self) -> Result<FeatureTable> {
        let ids = self.equity_ids();
        self.table.filter(|geo| ids.contains(&geo.geo_id))
    }

    /// Key columns, indicator columns, the two criteria flags, the combined
    /// `Criteria` label and the map `Designation`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = key_columns(self.tracts.iter().map(|tract| &tract.geography));
        for (j, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self.tracts.iter().map(|tract| tract.values[j]).collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }

        let flag_a: Vec<bool> = self.tracts.iter().map(|tract| tract.criteria_a).collect();
        let flag_b: Vec<bool> = self.tracts.iter().map(|tract| tract.criteria_b).collect();
        let criteria: Vec<&str> = self.tracts.iter().map(|tract| tract.criteria().to_str()).collect();
        let designation: Vec<&str> = self.tracts.iter().map(|tract| tract.designation()).collect();
        columns.push(Series::new("Criteria A".into(), flag_a).into());
        columns.push(Series::new("Criteria B".into(), flag_b).into());
        columns.push(Series::new("Criteria".into(), criteria).into());
        columns.push(Series::new("Designation".into(), designation).into());

        Ok(DataFrame::new(columns)?)
    }
}

/// Applies the two-criteria Equity Geography test.
#[derive(Debug, Clone)]
pub struct EquityClassifier {
    poc_indicator: String,
    poverty_indicator: String,
    remaining: Vec<String>,
    min_remaining: usize,
    percent_suffix: String,
}

impl EquityClassifier {
    pub fn new(config: &EquityConfig) -> Result<Self> {
        if config.remaining_indicators.is_empty() {
            return Err(ScoreError::invalid("remaining_indicators", "at least one indicator is required"));
        }
        if config.min_remaining == 0 || config.min_remaining > config.remaining_indicators.len() {
            return Err(ScoreError::invalid("min_remaining", format!(
                "must be between 1 and {}, got {}", config.remaining_indicators.len(), config.min_remaining,
            )));
        }

        Ok(Self {
            poc_indicator: config.poc_indicator.clone(),
            poverty_indicator: config.poverty_measure.indicator().to_string(),
            remaining: config.remaining_indicators.clone(),
            min_remaining: config.min_remaining,
            percent_suffix: config.percent_suffix.clone(),
        })
    }

    fn column(&self, indicator: &str) -> String {
        if self.percent_suffix.is_empty() {
            indicator.to_string()
        } else {
            format!("{indicator} {}", self.percent_suffix)
        }
    }

    /// Label every tract of `tracts` for one coefficient.
    ///
    /// Thresholds are recomputed from scratch over the full selection on
    /// every call. Criteria A needs both the people-of-color and low-income
    /// checks; Criteria B needs `min_remaining` of the remaining checks and
    /// the low-income check.
    pub fn classify(&self, tracts: &FeatureTable, coefficient: f64) -> Result<EquityGeographies> {
        if tracts.is_empty() { return Err(ScoreError::EmptyTable) }
        if !coefficient.is_finite() || coefficient < 0.0 {
            return Err(ScoreError::invalid("coefficient", format!("must be a non-negative number, got {coefficient}")));
        }

        let indicators: Vec<String> = [&self.poc_indicator, &self.poverty_indicator].into_iter()
            .chain(&self.remaining)
            .cloned()
            .collect();
        let columns: Vec<String> = indicators.iter().map(|indicator| self.column(indicator)).collect();

        let values = columns.iter()
            .map(|column| tracts.indicator(column))
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let thresholds: Vec<Threshold> = values.iter().map(|v| Threshold::new(v, coefficient)).collect();
        for (indicator, threshold) in indicators.iter().zip(&thresholds) {
            debug!(
                "[equity] {indicator}: mean {:.3} + {coefficient} * std {:.3} = {:.3}",
                threshold.mean, threshold.std, threshold.value,
            );
        }

        let tract_rows = tracts.geographies().iter().enumerate()
            .map(|(row, geography)| {
                let values: Vec<f64> = values.iter().map(|column| column[row]).collect();
                let checks: Vec<bool> = values.iter().zip(&thresholds)
                    .map(|(&value, threshold)| threshold.is_exceeded_by(value))
                    .collect();

                let poc = checks[0];
                let low_income = checks[1];
                let concentrated = checks[2..].iter().filter(|&&check| check).count();

                ClassifiedTract {
                    geography: geography.clone(),
                    criteria_a: poc && low_income,
                    criteria_b: concentrated >= self.min_remaining && low_income,
                    values,
                    checks,
                }
            })
            .collect::<Vec<_>>();

        let averages = indicators.iter().zip(&thresholds)
            .map(|(indicator, threshold)| (indicator.clone(), threshold.mean))
            .collect();

        let equity_rows: Vec<&ClassifiedTract> = tract_rows.iter().filter(|t| t.is_equity_geography()).collect();
        let equity_averages = if equity_rows.is_empty() {
            BTreeMap::new()
        } else {
            indicators.iter().enumerate()
                .map(|(j, indicator)| {
                    let subset: Vec<f64> = equity_rows.iter().map(|tract| tract.values[j]).collect();
                    (indicator.clone(), mean(&subset))
                })
                .collect()
        };

        info!(
            "[equity] {} of {} tracts are Equity Geographies at coefficient {coefficient}",
            equity_rows.len(), tract_rows.len(),
        );

        Ok(EquityGeographies {
            coefficient,
            thresholds: indicators.iter().cloned().zip(thresholds.iter().map(|t| t.value)).collect(),
            indicators,
            columns,
            tracts: tract_rows,
            averages,
            equity_averages,
            table: tracts.clone(),
        })
    }
}

/// Classify `tracts` at the concentration level configured in `config`.
pub fn get_equity_geographies(tracts: &FeatureTable, config: &EquityConfig) -> Result<EquityGeographies> {
    EquityClassifier::new(config)?.classify(tracts, config.concentration.coefficient())
}
