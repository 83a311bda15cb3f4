//! Normalization Utilities
//!
//! Percentile-clipped min-max scaling used for the temperature and elevation
//! terms of the hex score.

/// Quantile with linear interpolation between closest ranks
///
/// Missing values are skipped. Returns `None` when nothing is present.
/// Position of quantile `q` is `q × (n − 1)` in the sorted values.
pub fn quantile_linear(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (present.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(present[lower] + (present[upper] - present[lower]) * fraction)
}

/// Normalize to 0-1 after clipping to percentile bounds
///
/// Algorithm:
/// 1. `lo`, `hi` = quantiles `lower_q`, `upper_q` of the present values
/// 2. Range = `hi − lo`, or 1 when the bounds coincide
/// 3. `(clip(x, lo, hi) − lo) / range`, missing inputs become `fallback`
///
/// A constant column therefore normalizes to 0 everywhere.
pub fn minmax_clamped(
    values: &[Option<f64>],
    lower_q: f64,
    upper_q: f64,
    fallback: f64,
) -> Vec<f64> {
    let (Some(lo), Some(hi)) = (
        quantile_linear(values, lower_q),
        quantile_linear(values, upper_q),
    ) else {
        return vec![fallback; values.len()];
    };

    let range = if hi > lo { hi - lo } else { 1.0 };

    values
        .iter()
        .map(|v| match v {
            Some(x) => (x.max(lo).min(hi) - lo) / range,
            None => fallback,
        })
        .collect()
}
