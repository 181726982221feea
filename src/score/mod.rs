//! Relative Risk scoring: percent-to-count conversion, max-abs scaling,
//! optional feature crosses, summation, and the policy-adjusted priority rank.
//! Also the indicator correlation matrix used to pick features.

mod correlate;
mod cross;
mod normalize;
mod risk;
mod scale;
mod weighted;

pub use correlate::{INDICATOR, correlate, numeric_indicators};
pub use cross::{CROSSED, CrossedFeatures, cross_features, crossed_feature};
pub use normalize::{Feature, NormalizedTable, normalize};
pub use risk::{
    PolicyData, PolicyTerms, Priority, RankedGeography, RiskInput, RiskRanking,
    priority_indicator, rank_counties,
};
pub use scale::{max_abs_scale, min_max_scale};
pub use weighted::{descending_order, weighted_column_sum};
