use std::collections::HashMap;

use log::{debug, info, warn};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::{
    config::{PolicyColumns, RiskConfig},
    error::{Result, ScoreError},
    table::{FeatureTable, GeoId, Geography, key_columns},
};
use super::{
    cross::crossed_feature,
    normalize::normalize,
    weighted::{descending_order, weighted_column_sum},
};

pub const RELATIVE_RISK: &str = "Relative Risk";
pub const RANK: &str = "Rank";

/// Existing policy coverage for one geography.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyTerms {
    /// 0 = no policy in place, 1 = fully covered.
    pub value: f64,
    /// Time units remaining before the policy lapses.
    pub countdown: f64,
}

impl PolicyTerms {
    pub fn new(value: f64, countdown: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ScoreError::invalid("policy value", format!("{value} is outside [0, 1]")));
        }
        if countdown.is_nan() || countdown < 0.0 {
            return Err(ScoreError::invalid("countdown", format!("{countdown} is negative")));
        }
        Ok(Self { value, countdown })
    }
}

/// Policy terms keyed by geography, from an external policy source.
#[derive(Debug, Clone, Default)]
pub struct PolicyData {
    terms: HashMap<GeoId, PolicyTerms>,
}

impl PolicyData {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, geo_id: GeoId, terms: PolicyTerms) {
        self.terms.insert(geo_id, terms);
    }

    #[inline] pub fn get(&self, geo_id: &GeoId) -> Option<&PolicyTerms> { self.terms.get(geo_id) }

    #[inline] pub fn len(&self) -> usize { self.terms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Read policy terms from the configured columns of `table`.
    ///
    /// A geography with an empty value or countdown cell gets no terms, so
    /// [`RiskInput::with_policy`] treats it as uncovered.
    pub fn from_table(table: &FeatureTable, columns: &PolicyColumns) -> Result<Self> {
        let values = table.optional_indicator(&columns.value_column)?;
        let countdowns = table.optional_indicator(&columns.countdown_column)?;

        let mut data = Self::new();
        for ((geography, value), countdown) in table.geographies().iter().zip(values).zip(countdowns) {
            let (Some(value), Some(countdown)) = (value, countdown) else {
                debug!("[risk] {geography} has no policy terms, skipping");
                continue;
            };
            let terms = PolicyTerms::new(value, countdown).map_err(|err| match err {
                ScoreError::InvalidParameter { name, reason } => {
                    ScoreError::InvalidParameter { name, reason: format!("{reason} for {geography}") }
                }
                other => other,
            })?;
            data.insert(geography.geo_id.clone(), terms);
        }
        Ok(data)
    }

    /// True if every geography in `table` has policy terms.
    pub fn covers(&self, table: &FeatureTable) -> bool {
        table.geographies().iter().all(|geo| self.terms.contains_key(&geo.geo_id))
    }
}

/// Scoring input: either every geography carries policy terms, or none do.
#[derive(Debug, Clone)]
pub enum RiskInput {
    WithPolicy { features: FeatureTable, policy: PolicyData },
    WithoutPolicy { features: FeatureTable },
}

impl RiskInput {
    pub fn without_policy(features: FeatureTable) -> Self {
        Self::WithoutPolicy { features }
    }

    /// Attach policy terms, falling back to no adjustment for the whole run
    /// if any geography is not covered.
    pub fn with_policy(features: FeatureTable, policy: PolicyData) -> Self {
        if policy.covers(&features) {
            return Self::WithPolicy { features, policy };
        }
        let uncovered = features.geographies().iter()
            .filter(|geo| policy.get(&geo.geo_id).is_none())
            .count();
        warn!(
            "[risk] policy data is missing for {uncovered} of {} geographies; ranking without policy adjustment",
            features.len(),
        );
        Self::WithoutPolicy { features }
    }

    /// Use the policy columns of `table` when both are present.
    pub fn from_table(table: FeatureTable, config: &RiskConfig) -> Result<Self> {
        let columns = &config.policy;
        if !(table.has_column(&columns.value_column) && table.has_column(&columns.countdown_column)) {
            return Ok(Self::without_policy(table));
        }

        let policy = PolicyData::from_table(&table, columns)?;
        Ok(Self::with_policy(table, policy))
    }

    pub fn features(&self) -> &FeatureTable {
        match self {
            Self::WithPolicy { features, .. } | Self::WithoutPolicy { features } => features,
        }
    }
}

/// Relative Risk adjusted for existing policy coverage and time remaining.
///
/// `countdown` below 1 is clamped to 1.
pub fn priority_indicator(relative_risk: f64, policy_value: f64, countdown: f64) -> f64 {
    relative_risk * (1.0 - policy_value) / countdown.max(1.0).sqrt()
}

/// Policy terms and the resulting priority rank of one geography.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priority {
    pub policy_value: f64,
    pub countdown: f64,
    pub rank: f64,
}

#[derive(Debug, Clone)]
pub struct RankedGeography {
    pub geography: Geography,
    /// Scaled feature values, in `RiskRanking::feature_names` order.
    pub features: Vec<f64>,
    pub relative_risk: f64,
    pub priority: Option<Priority>,
}

/// Geographies ordered by priority rank when policy terms are present,
/// otherwise by Relative Risk. Ties are ordered by state, then name.
#[derive(Debug, Clone)]
pub struct RiskRanking {
    label: String,
    feature_names: Vec<String>,
    rows: Vec<RankedGeography>,
    with_policy: bool,
}

impl RiskRanking {
    #[inline] pub fn label(&self) -> &str { &self.label }

    #[inline] pub fn feature_names(&self) -> &[String] { &self.feature_names }

    #[inline] pub fn rows(&self) -> &[RankedGeography] { &self.rows }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    #[inline] pub fn has_priority(&self) -> bool { self.with_policy }

    pub fn get(&self, geo_id: &GeoId) -> Option<&RankedGeography> {
        self.rows.iter().find(|row| row.geography.geo_id == *geo_id)
    }

    /// Key columns, scaled features, `Relative Risk`, then policy terms and `Rank`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = key_columns(self.rows.iter().map(|row| &row.geography));
        for (j, name) in self.feature_names.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|row| row.features[j]).collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        columns.push(float_column(RELATIVE_RISK, self.rows.iter().map(|row| row.relative_risk)));

        if self.with_policy {
            let priorities: Vec<Priority> = self.rows.iter().filter_map(|row| row.priority).collect();
            columns.push(float_column("Policy Value", priorities.iter().map(|p| p.policy_value)));
            columns.push(float_column("Countdown", priorities.iter().map(|p| p.countdown)));
            columns.push(float_column(RANK, priorities.iter().map(|p| p.rank)));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Rows by descending score; equal scores fall back to (state, name) order.
fn rank_order(scores: &[f64], geographies: &[Geography]) -> Vec<usize> {
    let mut alphabetical: Vec<usize> = (0..geographies.len()).collect();
    alphabetical.sort_by(|&a, &b| {
        let (a, b) = (&geographies[a], &geographies[b]);
        a.state.cmp(&b.state).then_with(|| a.name.cmp(&b.name))
    });

    let sorted: Vec<f64> = alphabetical.iter().map(|&row| scores[row]).collect();
    descending_order(&sorted).into_iter().map(|i| alphabetical[i]).collect()
}

fn float_column(name: &str, values: impl Iterator<Item = f64>) -> Column {
    Series::new(name.into(), values.collect::<Vec<f64>>()).into()
}

/// Score and rank every geography in `input`.
///
/// Features are normalized, optionally joined by the rescaled cross term,
/// summed per geography, and divided by the largest sum so the top
/// geography scores exactly 1. Sums are floored at 0, so negative inputs
/// cannot push a score below 0. An all-zero table scores 0 everywhere.
pub fn rank_counties(input: &RiskInput, config: &RiskConfig, label: &str) -> Result<RiskRanking> {
    let table = input.features();
    let mut normalized = normalize(table, config)?;
    if config.cross {
        let crossed = crossed_feature(&normalized, &config.cross_features)?;
        normalized = normalized.with_feature(crossed)?;
    }

    let columns: Vec<&[f64]> = normalized.features().iter().map(|f| f.values.as_slice()).collect();
    let sums: Vec<f64> = weighted_column_sum(&columns, &vec![1.0; columns.len()])?
        .into_iter()
        .map(|sum| sum.max(0.0))
        .collect();

    let max_sum = sums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let relative_risk: Vec<f64> = if max_sum > 0.0 && max_sum.is_finite() {
        sums.iter().map(|sum| sum / max_sum).collect()
    } else {
        warn!("[risk] largest feature sum is {max_sum}; every Relative Risk is 0");
        vec![0.0; sums.len()]
    };
    debug!("[risk] scored {} geographies on {} features", sums.len(), columns.len());

    let priorities: Option<Vec<Priority>> = match input {
        RiskInput::WithoutPolicy { .. } => None,
        RiskInput::WithPolicy { policy, .. } => Some(
            table.geographies().iter().zip(&relative_risk)
                .map(|(geo, &risk)| {
                    let terms = policy.get(&geo.geo_id)
                        .ok_or_else(|| ScoreError::UnmatchedGeography { geography: geo.to_string() })?;
                    Ok(Priority {
                        policy_value: terms.value,
                        countdown: terms.countdown,
                        rank: priority_indicator(risk, terms.value, terms.countdown),
                    })
                })
                .collect::<Result<Vec<Priority>>>()?
        ),
    };

    let scores = match &priorities {
        Some(priorities) => priorities.iter().map(|p| p.rank).collect(),
        None => relative_risk.clone(),
    };
    let order = rank_order(&scores, table.geographies());

    let rows = order.into_iter()
        .map(|row| RankedGeography {
            geography: normalized.geographies()[row].clone(),
            features: normalized.features().iter().map(|f| f.values[row]).collect(),
            relative_risk: relative_risk[row],
            priority: priorities.as_ref().map(|p| p[row]),
        })
        .collect::<Vec<_>>();

    if let Some(top) = rows.first() {
        info!("[risk] {label}: highest ranked is {} (Relative Risk {:.3})", top.geography, top.relative_risk);
    }

    Ok(RiskRanking {
        label: label.to_string(),
        feature_names: normalized.feature_names().into_iter().map(String::from).collect(),
        rows,
        with_policy: priorities.is_some(),
    })
}
