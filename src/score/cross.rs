use log::debug;

use crate::error::{Result, ScoreError};
use super::normalize::{Feature, NormalizedTable};

/// Name of the combined cross-term feature.
pub const CROSSED: &str = "Crossed";

/// Pairwise products of scaled features, and their row mean.
#[derive(Debug, Clone)]
pub struct CrossedFeatures {
    /// One column per unordered pair, named `"{a}_X_{b}"`.
    pub pairs: Vec<(String, Vec<f64>)>,
    pub mean: Vec<f64>,
}

/// Row-wise absolute product of every unordered pair of `columns`.
///
/// A geography that scores high on two indicators at once gets a
/// disproportionately larger cross term than either indicator alone.
pub fn cross_features<S: AsRef<str>>(table: &NormalizedTable, columns: &[S]) -> Result<CrossedFeatures> {
    if columns.len() < 2 {
        return Err(ScoreError::invalid("cross_features", format!(
            "need at least two features to cross, got {}", columns.len(),
        )));
    }

    let features = columns.iter()
        .map(|name| {
            let name = name.as_ref();
            table.feature(name).ok_or_else(|| ScoreError::missing_column(name))
        })
        .collect::<Result<Vec<&Feature>>>()?;

    let mut pairs = Vec::with_capacity(features.len() * (features.len() - 1) / 2);
    for (i, a) in features.iter().enumerate() {
        for b in &features[i + 1..] {
            let product: Vec<f64> = a.values.iter().zip(&b.values).map(|(x, y)| (x * y).abs()).collect();
            pairs.push((format!("{}_X_{}", a.name, b.name), product));
        }
    }

    let mean = (0..table.len())
        .map(|row| pairs.iter().map(|(_, values)| values[row]).sum::<f64>() / pairs.len() as f64)
        .collect();

    debug!("[cross] crossed {} features into {} pairs", features.len(), pairs.len());
    Ok(CrossedFeatures { pairs, mean })
}

/// The mean cross term, rescaled to [-1, 1] so it weighs as much as any
/// other feature in the final sum.
pub fn crossed_feature<S: AsRef<str>>(table: &NormalizedTable, columns: &[S]) -> Result<Feature> {
    let crossed = cross_features(table, columns)?;
    Ok(Feature::scaled(CROSSED, &crossed.mean))
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame, NamedFrom, Series};

    use crate::{config::{RiskConfig, TableSchema}, score::normalize, table::FeatureTable};
    use super::*;

    fn normalized() -> NormalizedTable {
        let columns: Vec<Column> = vec![
            Series::new("county_id".into(), &["01001", "01003", "01005"]).into(),
            Series::new("State".into(), &["Alabama"; 3]).into(),
            Series::new("County Name".into(), &["Autauga County", "Baldwin County", "Barbour County"]).into(),
            Series::new("Resident Population (Thousands of Persons)".into(), &[1.0, 1.0, 1.0]).into(),
            Series::new("a".into(), &[1.0, 0.5, 0.0]).into(),
            Series::new("b".into(), &[1.0, 1.0, 0.5]).into(),
            Series::new("c".into(), &[-1.0, 0.5, 1.0]).into(),
        ];
        let table = FeatureTable::from_frame(DataFrame::new(columns).unwrap(), &TableSchema::counties()).unwrap();
        normalize(&table, &RiskConfig::default()).unwrap()
    }

    #[test]
    fn crosses_every_unordered_pair() {
        let crossed = cross_features(&normalized(), &["a", "b", "c"]).unwrap();
        let names: Vec<&str> = crossed.pairs.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["a_X_b", "a_X_c", "b_X_c"]);

        // Products are absolute: a * c = -1 for the first row.
        assert_eq!(crossed.pairs[1].1, vec![1.0, 0.25, 0.0]);
        assert_eq!(crossed.mean[0], 1.0);
    }

    #[test]
    fn crossed_feature_is_rescaled() {
        let feature = crossed_feature(&normalized(), &["a", "b", "c"]).unwrap();
        assert_eq!(feature.name, CROSSED);
        let max = feature.values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert_eq!(max, 1.0);
    }

    #[test]
    fn missing_feature_is_named() {
        let err = cross_features(&normalized(), &["a", "Pop Unemployed"]).unwrap_err();
        assert!(err.to_string().contains("Pop Unemployed"));
    }

    #[test]
    fn single_feature_cannot_be_crossed() {
        assert!(cross_features(&normalized(), &["a"]).is_err());
    }
}
