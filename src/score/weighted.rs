use crate::error::{Result, ScoreError};

/// Row-wise `Σ weights[j] * columns[j][i]`.
///
/// Shared by the Relative Risk sum (unit weights over max-abs scaled columns)
/// and the transportation index (analyst weights over min-max scaled columns).
pub fn weighted_column_sum(columns: &[&[f64]], weights: &[f64]) -> Result<Vec<f64>> {
    if columns.len() != weights.len() {
        return Err(ScoreError::invalid("weights", format!(
            "{} weights for {} columns", weights.len(), columns.len(),
        )));
    }

    let rows = columns.first().map_or(0, |column| column.len());
    if let Some(column) = columns.iter().find(|column| column.len() != rows) {
        return Err(ScoreError::invalid("columns", format!(
            "column of length {} does not match {rows} rows", column.len(),
        )));
    }

    let mut sums = vec![0.0; rows];
    for (column, &weight) in columns.iter().zip(weights) {
        for (sum, value) in sums.iter_mut().zip(column.iter()) {
            *sum += weight * value;
        }
    }
    Ok(sums)
}

/// Row indices ordered by descending value. Stable: ties keep input order.
pub fn descending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}
