//! Summary statistics over feature tracks.
//!
//! Every function returns `None` when the statistic is undefined (empty input,
//! zero denominator) so callers pick their own fallback.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by `n`).
pub fn variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some(m2 / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Peak-to-peak: `max - min`.
pub fn peak_to_peak(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(max - min)
}

/// Successive differences `values[i + 1] - values[i]`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Standard deviation of `spread` divided by the mean of `scale`.
///
/// With `spread == scale` this is the plain coefficient of variation.
pub fn relative_spread(spread: &[f64], scale: &[f64]) -> Option<f64> {
    let sd = std_dev(spread)?;
    let mean = mean(scale)?;
    if mean.abs() < f64::EPSILON {
        return None;
    }
    let ratio = sd / mean;
    ratio.is_finite().then_some(ratio)
}

/// Coefficient of variation (`std / mean`).
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    relative_spread(values, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(variance(&values), Some(4.0));
        assert_eq!(std_dev(&values), Some(2.0));
    }

    #[test]
    fn test_empty_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(variance(&[]), None);
        assert_eq!(peak_to_peak(&[]), None);
        assert_eq!(coefficient_of_variation(&[]), None);
    }

    #[test]
    fn test_peak_to_peak() {
        assert_eq!(peak_to_peak(&[3.0, -1.0, 8.0]), Some(9.0));
        assert_eq!(peak_to_peak(&[1.5]), Some(0.0));
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![3.0, -2.0]);
        assert!(diff(&[1.0]).is_empty());
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[5.0, 5.0, 5.0]), Some(0.0));
        let cv = coefficient_of_variation(&[1.0, 3.0]).unwrap();
        assert!((cv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_mean_is_undefined() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), None);
        assert_eq!(relative_spread(&[1.0, 2.0], &[-1.0, 1.0]), None);
    }
}
