#![doc = "OpenEquity public API"]
mod config;
mod cost;
mod equity;
mod error;
mod score;
mod table;

pub mod io;

#[doc(inline)]
pub use error::{Result, ScoreError};

#[doc(inline)]
pub use config::{
    AnalysisConfig, CostConfig, EquityConfig, PolicyColumns, RiskConfig, TableSchema, TransportConfig,
};

#[doc(inline)]
pub use table::{FeatureTable, GeoId, GeoType, Geography};

#[doc(inline)]
pub use score::{
    CROSSED, CrossedFeatures, Feature, INDICATOR, NormalizedTable, PolicyData, PolicyTerms, Priority, RankedGeography,
    RiskInput, RiskRanking, correlate, cross_features, crossed_feature, descending_order, max_abs_scale, min_max_scale,
    normalize, numeric_indicators, priority_indicator, rank_counties, weighted_column_sum,
};

#[doc(inline)]
pub use equity::{
    AverageComparison, ClassifiedTract, Concentration, Criteria, EquityClassifier, EquityGeographies,
    INDEX_VALUE, IndexedTract, IndicatorWeight, PovertyMeasure, Threshold, TransportIndex, TransportWeights,
    build_index, compare_averages, get_equity_geographies,
};

#[doc(inline)]
pub use cost::{CostEstimate, GeographyCost, HOUSING_STOCK_DISTRIBUTION, RentType, TOTAL_COST, estimate_eviction_cost};
