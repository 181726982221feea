//! Analysis configuration.
//!
//! Every pipeline variant is driven by one of these structs instead of
//! hard-coded column names. All sections default to the column names served
//! by the county and census tract data layer, so an empty TOML file is a
//! valid configuration.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    cost::{HOUSING_STOCK_DISTRIBUTION, RentType},
    equity::{Concentration, IndicatorWeight, PovertyMeasure},
    error::Result,
    table::GeoType,
};

/// Top-level configuration, one section per pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(deserialize_with = "county_schema")]
    pub counties: TableSchema,
    #[serde(deserialize_with = "tract_schema")]
    pub tracts: TableSchema,
    pub risk: RiskConfig,
    pub equity: EquityConfig,
    pub transport: TransportConfig,
    pub cost: CostConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            counties: TableSchema::counties(),
            tracts: TableSchema::tracts(),
            risk: RiskConfig::default(),
            equity: EquityConfig::default(),
            transport: TransportConfig::default(),
            cost: CostConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Names of the key columns in a raw table from the data layer.
///
/// Fields left out of the `[counties]` or `[tracts]` section fall back to
/// [`TableSchema::counties`] or [`TableSchema::tracts`] respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub geo_type: GeoType,
    pub id_column: String,
    pub state_column: String,
    pub name_column: String,
}

impl TableSchema {
    pub fn counties() -> Self {
        Self {
            geo_type: GeoType::County,
            id_column: "county_id".into(),
            state_column: "State".into(),
            name_column: "County Name".into(),
        }
    }

    pub fn tracts() -> Self {
        Self {
            geo_type: GeoType::Tract,
            id_column: "tract_id".into(),
            state_column: "State".into(),
            name_column: "Census Tract".into(),
        }
    }
}

/// A schema section where every field is optional.
#[derive(Deserialize)]
struct SchemaOverrides {
    geo_type: Option<GeoType>,
    id_column: Option<String>,
    state_column: Option<String>,
    name_column: Option<String>,
}

impl SchemaOverrides {
    fn apply(self, base: TableSchema) -> TableSchema {
        TableSchema {
            geo_type: self.geo_type.unwrap_or(base.geo_type),
            id_column: self.id_column.unwrap_or(base.id_column),
            state_column: self.state_column.unwrap_or(base.state_column),
            name_column: self.name_column.unwrap_or(base.name_column),
        }
    }
}

fn county_schema<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<TableSchema, D::Error> {
    Ok(SchemaOverrides::deserialize(deserializer)?.apply(TableSchema::counties()))
}

fn tract_schema<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<TableSchema, D::Error> {
    Ok(SchemaOverrides::deserialize(deserializer)?.apply(TableSchema::tracts()))
}

/// Columns carrying the optional policy adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyColumns {
    pub value_column: String,
    pub countdown_column: String,
}

impl Default for PolicyColumns {
    fn default() -> Self {
        Self { value_column: "Policy Value".into(), countdown_column: "Countdown".into() }
    }
}

/// Relative Risk pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Total population column, the denominator for percent-to-count conversion.
    pub population_column: String,
    /// Factor applied to the population column (it is reported in thousands).
    pub population_multiplier: f64,
    /// Any column ending with this suffix is percentage-typed.
    pub percent_suffix: String,
    /// Explicit count-column names for percentage columns (source -> target).
    /// Unlisted percentage columns drop the suffix.
    pub percent_columns: BTreeMap<String, String>,
    /// Percentage columns derived as `100 - source` (source -> target).
    pub complements: BTreeMap<String, String>,
    /// Non-feature columns ignored by the scorer.
    pub excluded_columns: Vec<String>,
    /// Fold pairwise feature crosses into the score.
    pub cross: bool,
    pub cross_features: Vec<String>,
    pub policy: PolicyColumns,
}

impl Default for RiskConfig {
    fn default() -> Self {
        let percent_columns = [
            ("Population Below Poverty Line (%)", "Pop Below Poverty Level"),
            ("Unemployment Rate (%)", "Pop Unemployed"),
            ("Burdened Households (%)", "Num Burdened Households"),
            ("Single Parent Households (%)", "Num Single Parent Households"),
            ("Non-Home Ownership (%)", "Non-Home Ownership Pop"),
        ];

        Self {
            population_column: "Resident Population (Thousands of Persons)".into(),
            population_multiplier: 1000.0,
            percent_suffix: "(%)".into(),
            percent_columns: percent_columns.into_iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect(),
            complements: BTreeMap::from([
                ("Home Ownership (%)".to_string(), "Non-Home Ownership (%)".to_string()),
            ]),
            excluded_columns: [
                "Burdened Households Date",
                "Home Ownership Date",
                "Income Inequality Date",
                "Population Below Poverty Line Date",
                "Single Parent Households Date",
                "SNAP Benefits Recipients Date",
                "Unemployment Rate Date",
                "Resident Population Date",
            ].into_iter().map(String::from).collect(),
            cross: false,
            cross_features: [
                "Pop Below Poverty Level",
                "Pop Unemployed",
                "Income Inequality (Ratio)",
                "Non-Home Ownership Pop",
                "Num Burdened Households",
                "Num Single Parent Households",
            ].into_iter().map(String::from).collect(),
            policy: PolicyColumns::default(),
        }
    }
}

/// Equity Geography classification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    pub poc_indicator: String,
    /// Which low-income measure feeds both criteria.
    pub poverty_measure: PovertyMeasure,
    pub remaining_indicators: Vec<String>,
    /// Criteria B needs at least this many remaining indicators concentrated.
    pub min_remaining: usize,
    /// Indicator values live in columns named `"{indicator} {suffix}"`.
    pub percent_suffix: String,
    pub concentration: Concentration,
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            poc_indicator: "People of Color".into(),
            poverty_measure: PovertyMeasure::default(),
            remaining_indicators: [
                "People with Disability",
                "Age 19 or Under",
                "Age 65 or Over",
                "Limited English Proficiency",
                "Single Parent Family",
                "Zero-Vehicle Household",
            ].into_iter().map(String::from).collect(),
            min_remaining: 3,
            percent_suffix: "(%)".into(),
            concentration: Concentration::default(),
        }
    }
}

/// Transportation Vulnerability Index configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub weights: Vec<IndicatorWeight>,
    /// Keep only the N highest-ranked tracts in the output.
    pub top: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let weights = [
            ("Zero-Vehicle Household (%)", 20),
            ("200% Below Poverty Level (%)", 20),
            ("Renter Occupied Units (%)", 15),
            ("Drive Alone Commuters (%)", 15),
            ("No Computer Households (%)", 10),
            ("Vehicle Miles Traveled", 10),
            ("Water Hazard Risk Score", 10),
        ];

        Self {
            weights: weights.into_iter()
                .map(|(indicator, weight)| IndicatorWeight { indicator: indicator.into(), weight })
                .collect(),
            top: None,
        }
    }
}

/// Cost-to-avoid-evictions configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub rent_type: RentType,
    /// Share of the burdened population to support, in percent.
    pub percent_burdened: f64,
    /// Housing stock shares for 0..=4 bedroom units.
    pub distribution: [f64; 5],
    pub population_column: String,
    pub population_multiplier: f64,
    pub burdened_column: String,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            rent_type: RentType::FairMarket,
            percent_burdened: 50.0,
            distribution: HOUSING_STOCK_DISTRIBUTION,
            population_column: "Resident Population (Thousands of Persons)".into(),
            population_multiplier: 1000.0,
            burdened_column: "Burdened Households (%)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config.counties, TableSchema::counties());
        assert_eq!(config.tracts, TableSchema::tracts());
        assert_eq!(config.risk, RiskConfig::default());
        assert_eq!(config.equity.min_remaining, 3);
        assert_eq!(config.transport.weights.iter().map(|w| w.weight).sum::<u32>(), 100);
    }

    #[test]
    fn partial_sections_override_defaults() {
        let config = AnalysisConfig::from_toml_str(r#"
            [risk]
            cross = true
            population_multiplier = 1.0

            [equity]
            concentration = "high"
            poverty_measure = "below_poverty_level"

            [tracts]
            geo_type = "tract"
            id_column = "GEOID"

            [[transport.weights]]
            indicator = "Vehicle Miles Traveled"
            weight = 100
        "#).unwrap();

        assert!(config.risk.cross);
        assert_eq!(config.risk.population_multiplier, 1.0);
        assert_eq!(config.risk.population_column, "Resident Population (Thousands of Persons)");
        assert_eq!(config.equity.concentration, Concentration::High);
        assert_eq!(config.equity.poverty_measure, PovertyMeasure::BelowPovertyLevel);
        assert_eq!(config.tracts.id_column, "GEOID");
        assert_eq!(config.tracts.geo_type, GeoType::Tract);
        assert_eq!(config.transport.weights.len(), 1);
    }

    #[test]
    fn tract_section_keeps_tract_defaults() {
        let config = AnalysisConfig::from_toml_str("[tracts]\nid_column = \"GEOID\"\n").unwrap();
        assert_eq!(config.tracts.geo_type, GeoType::Tract);
        assert_eq!(config.tracts.id_column, "GEOID");
        assert_eq!(config.tracts.name_column, "Census Tract");
        assert_eq!(config.counties, TableSchema::counties());

        let config = AnalysisConfig::from_toml_str("[counties]\nname_column = \"County\"\n").unwrap();
        assert_eq!(config.counties.id_column, "county_id");
        assert_eq!(config.counties.name_column, "County");
    }

    #[test]
    fn unknown_concentration_is_rejected() {
        let result = AnalysisConfig::from_toml_str("[equity]\nconcentration = \"extreme\"\n");
        assert!(result.is_err());
    }
}
