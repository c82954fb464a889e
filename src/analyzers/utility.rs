/// Arithmetic mean of the non-NaN values. Returns NaN when none are left.
pub fn mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values.iter().filter(|v| !v.is_nan()) {
        sum += v;
        count += 1;
    }
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Smallest non-NaN value, or `None` if every value is NaN.
pub fn min(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::min)
}

/// Largest non-NaN value, or `None` if every value is NaN.
pub fn max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
}
