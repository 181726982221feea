/// Arithmetic mean, `0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() { return 0.0 }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), `0` for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 { return 0.0 }
    let mean = mean(values);
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Concentration threshold `mean + coefficient * std` over one indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub mean: f64,
    pub std: f64,
    pub value: f64,
}

impl Threshold {
    pub fn new(values: &[f64], coefficient: f64) -> Self {
        let mean = mean(values);
        let std = sample_std(values);
        Self { mean, std, value: mean + coefficient * std }
    }

    /// Strictly above the threshold; a value exactly at it is not concentrated.
    #[inline] pub fn is_exceeded_by(&self, value: f64) -> bool { value > self.value }
}
