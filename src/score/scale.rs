//! Column scalers.
//!
//! A constant (or all-zero) column scales to all zeros instead of NaN/Inf.

/// Divide by the largest absolute value, mapping into [-1, 1].
/// Returns the scaled values and the divisor (0 for an all-zero column).
pub fn max_abs_scale(values: &[f64]) -> (Vec<f64>, f64) {
    let divisor = values.iter().fold(0.0_f64, |max, v| max.max(v.abs()));
    if divisor == 0.0 || !divisor.is_finite() {
        return (vec![0.0; values.len()], 0.0);
    }
    (values.iter().map(|v| v / divisor).collect(), divisor)
}

/// `(x - min) / (max - min)`, mapping into [0, 1].
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let (min, max) = values.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}
