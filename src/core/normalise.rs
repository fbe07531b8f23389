//! Row statistics used to normalise pathway scores.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Z-score normalisation: (x - mean) / std.
/// A flat or single-value row has no defined spread and maps to NaN.
pub fn zscore(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let sd = sample_std(values);
    if !sd.is_finite() || sd.abs() < 1e-12 {
        return vec![f64::NAN; values.len()];
    }
    values.iter().map(|v| (v - m) / sd).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_std() {
        // 2, 4, 4, 4, 5, 5, 7, 9: population std 2.0, sample std sqrt(32/7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((sample_std(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zscore_centres_and_scales() {
        let z = zscore(&[10.0, 20.0, 30.0]);
        assert!((z[0] + 1.0).abs() < 1e-12);
        assert!(z[1].abs() < 1e-12);
        assert!((z[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zscore_degenerate_rows() {
        assert!(zscore(&[3.0, 3.0, 3.0]).iter().all(|v| v.is_nan()));
        assert!(zscore(&[1.0]).iter().all(|v| v.is_nan()));
        assert!(zscore(&[]).is_empty());
    }
}
