use std::collections::HashSet;

use log::{debug, warn};
use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::{
    config::RiskConfig,
    error::{Result, ScoreError},
    table::{FeatureTable, Geography, key_columns},
};
use super::scale::max_abs_scale;

/// One scaled indicator column.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub values: Vec<f64>,
    /// Max-abs divisor computed for this run (0 for an all-zero column).
    pub divisor: f64,
}

impl Feature {
    /// Scale `values` by their largest absolute value.
    pub fn scaled(name: impl Into<String>, values: &[f64]) -> Self {
        let (values, divisor) = max_abs_scale(values);
        Self { name: name.into(), values, divisor }
    }
}

/// A feature table after percent-to-count conversion and max-abs scaling.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    geographies: Vec<Geography>,
    features: Vec<Feature>,
}

impl NormalizedTable {
    #[inline] pub fn geographies(&self) -> &[Geography] { &self.geographies }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    #[inline] pub fn len(&self) -> usize { self.geographies.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geographies.is_empty() }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.name == name)
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|feature| feature.name.as_str()).collect()
    }

    /// Append a derived feature, replacing any existing feature of the same name.
    pub fn with_feature(mut self, feature: Feature) -> Result<Self> {
        if feature.values.len() != self.len() {
            return Err(ScoreError::invalid("feature", format!(
                "'{}' has {} values for {} geographies", feature.name, feature.values.len(), self.len(),
            )));
        }
        self.features.retain(|existing| existing.name != feature.name);
        self.features.push(feature);
        Ok(self)
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = key_columns(&self.geographies);
        columns.extend(self.features.iter().map(|f| Series::new(f.name.as_str().into(), &f.values).into()));
        Ok(DataFrame::new(columns)?)
    }
}

/// Convert percentage indicators to absolute counts and max-abs scale every
/// feature column over the rows of `table`.
///
/// The population column, excluded columns, and policy columns are not
/// features: percentages are folded into counts with the population, and
/// policy terms are applied after scoring.
pub fn normalize(table: &FeatureTable, config: &RiskConfig) -> Result<NormalizedTable> {
    if table.is_empty() { return Err(ScoreError::EmptyTable) }
    if config.population_multiplier.is_nan() || config.population_multiplier <= 0.0 {
        return Err(ScoreError::invalid("population_multiplier", format!(
            "must be positive, got {}", config.population_multiplier,
        )));
    }

    let population = table.indicator(&config.population_column)?;

    let mut skipped: HashSet<&str> = config.excluded_columns.iter().map(String::as_str).collect();
    skipped.insert(&config.population_column);
    skipped.insert(&config.policy.value_column);
    skipped.insert(&config.policy.countdown_column);

    let mut raw: Vec<(String, Vec<f64>)> = Vec::new();
    for name in table.column_names() {
        if skipped.contains(name.as_str()) { continue }

        let (name, values) = match config.complements.get(&name) {
            Some(target) if !table.has_column(target) => {
                debug!("[normalize] deriving '{target}' as 100 - '{name}'");
                let values = table.indicator(&name)?.into_iter().map(|p| 100.0 - p).collect();
                (target.clone(), values)
            }
            _ => {
                let values = table.indicator(&name)?;
                (name, values)
            }
        };

        match count_column(&name, config) {
            Some(target) => {
                debug!("[normalize] converting '{name}' to counts as '{target}'");
                let counts = values.iter().zip(&population)
                    .map(|(percent, pop)| percent / 100.0 * pop * config.population_multiplier)
                    .collect();
                raw.push((target, counts));
            }
            None => raw.push((name, values)),
        }
    }

    let mut seen = HashSet::new();
    let features = raw.into_iter()
        .filter(|(name, _)| {
            let first = seen.insert(name.clone());
            if !first { warn!("[normalize] feature '{name}' produced twice, keeping the first") }
            first
        })
        .map(|(name, values)| {
            let feature = Feature::scaled(name, &values);
            if feature.divisor == 0.0 {
                warn!("[normalize] feature '{}' is zero for every geography", feature.name);
            }
            feature
        })
        .collect();

    Ok(NormalizedTable { geographies: table.geographies().to_vec(), features })
}

/// Count-column name for a percentage-typed column, `None` if not a percentage.
fn count_column(name: &str, config: &RiskConfig) -> Option<String> {
    if let Some(target) = config.percent_columns.get(name) {
        return Some(target.clone());
    }
    if config.percent_suffix.is_empty() { return None }
    name.strip_suffix(config.percent_suffix.as_str()).map(|stem| stem.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame, NamedFrom, Series};

    use crate::config::TableSchema;
    use super::*;

    fn table(columns: Vec<Series>) -> FeatureTable {
        let n = columns[0].len();
        let ids: Vec<String> = (0..n).map(|i| format!("0800{i}")).collect();
        let names: Vec<String> = (0..n).map(|i| format!("County {i}")).collect();
        let mut all: Vec<Column> = vec![
            Series::new("county_id".into(), ids).into(),
            Series::new("State".into(), vec!["Colorado"; n]).into(),
            Series::new("County Name".into(), names).into(),
        ];
        all.extend(columns.into_iter().map(Into::into));
        FeatureTable::from_frame(DataFrame::new(all).unwrap(), &TableSchema::counties()).unwrap()
    }

    #[test]
    fn converts_percentages_to_counts() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[10.0, 20.0]),
            Series::new("Unemployment Rate (%)".into(), &[10.0, 10.0]),
            Series::new("Median Age".into(), &[40.0, 20.0]),
        ]);
        let normalized = normalize(&table, &RiskConfig::default()).unwrap();

        assert_eq!(normalized.feature_names(), vec!["Pop Unemployed", "Median Age"]);
        let unemployed = normalized.feature("Pop Unemployed").unwrap();
        assert_eq!(unemployed.divisor, 2000.0);
        assert_eq!(unemployed.values, vec![0.5, 1.0]);
        assert_eq!(normalized.feature("Median Age").unwrap().values, vec![1.0, 0.5]);
    }

    #[test]
    fn unlisted_percentages_drop_the_suffix() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[1.0, 1.0]),
            Series::new("Non-White Population (%)".into(), &[25.0, 50.0]),
        ]);
        let normalized = normalize(&table, &RiskConfig::default()).unwrap();
        assert_eq!(normalized.feature_names(), vec!["Non-White Population"]);
    }

    #[test]
    fn home_ownership_becomes_non_home_ownership_count() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[1.0, 1.0]),
            Series::new("Home Ownership (%)".into(), &[75.0, 50.0]),
        ]);
        let normalized = normalize(&table, &RiskConfig::default()).unwrap();
        let feature = normalized.feature("Non-Home Ownership Pop").unwrap();
        assert_eq!(feature.divisor, 500.0);
        assert_eq!(feature.values, vec![0.5, 1.0]);
    }

    #[test]
    fn policy_and_excluded_columns_are_set_aside() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[1.0, 2.0]),
            Series::new("Income Inequality (Ratio)".into(), &[4.0, 5.0]),
            Series::new("Policy Value".into(), &[0.0, 1.0]),
            Series::new("Countdown".into(), &[3.0, 1.0]),
            Series::new("Unemployment Rate Date".into(), &["2021-01", "2021-01"]),
        ]);
        let normalized = normalize(&table, &RiskConfig::default()).unwrap();
        assert_eq!(normalized.feature_names(), vec!["Income Inequality (Ratio)"]);
    }

    #[test]
    fn every_column_is_bounded_by_one() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[5.0, 50.0, 500.0]),
            Series::new("Population Below Poverty Line (%)".into(), &[30.0, 12.0, 8.0]),
            Series::new("Income Inequality (Ratio)".into(), &[-4.2, 5.1, 0.0]),
            Series::new("Vacant Units".into(), &[0.0, 0.0, 0.0]),
        ]);
        let normalized = normalize(&table, &RiskConfig::default()).unwrap();
        for feature in normalized.features() {
            let max = feature.values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            assert!(max == 1.0 || feature.values.iter().all(|v| *v == 0.0), "{}", feature.name);
        }
    }

    #[test]
    fn missing_population_is_an_error() {
        let table = table(vec![Series::new("Unemployment Rate (%)".into(), &[1.0])]);
        let err = normalize(&table, &RiskConfig::default()).unwrap_err();
        assert!(matches!(err, ScoreError::MissingColumn { ref column } if column.starts_with("Resident Population")));
    }

    #[test]
    fn text_feature_is_an_error() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[1.0]),
            Series::new("Region".into(), &["West"]),
        ]);
        assert!(matches!(normalize(&table, &RiskConfig::default()), Err(ScoreError::NonNumericColumn { .. })));
    }

    #[test]
    fn input_table_is_untouched() {
        let table = table(vec![
            Series::new("Resident Population (Thousands of Persons)".into(), &[1.0, 2.0]),
            Series::new("Unemployment Rate (%)".into(), &[5.0, 6.0]),
        ]);
        let before = table.column_names();
        normalize(&table, &RiskConfig::default()).unwrap();
        assert_eq!(table.column_names(), before);
        assert_eq!(table.indicator("Unemployment Rate (%)").unwrap(), vec![5.0, 6.0]);
    }
}
