//! Equity Geography classification and the transportation vulnerability index.

mod classify;
mod stats;
mod transport;

pub use classify::{
    ClassifiedTract, Concentration, Criteria, EquityClassifier, EquityGeographies, PovertyMeasure,
    get_equity_geographies,
};
pub use stats::Threshold;
pub use transport::{
    AverageComparison, INDEX_VALUE, IndexedTract, IndicatorWeight, TransportIndex, TransportWeights,
    build_index, compare_averages,
};
