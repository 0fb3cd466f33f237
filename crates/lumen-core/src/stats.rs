//! Descriptive statistics over plain slices

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation (divides by n)
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Largest |a - b| over all pairs. `None` for fewer than two values or
/// when any value is NaN or infinite.
pub fn max_abs_pairwise_difference(values: &[f64]) -> Option<f64> {
    if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    Some(max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(population_std_dev(&values), Some(2.0));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std_dev(&[]), None);
        assert_eq!(max_abs_pairwise_difference(&[3.0]), None);
    }

    #[test]
    fn test_max_pairwise() {
        assert_eq!(max_abs_pairwise_difference(&[50.0, 56.0, 52.0]), Some(6.0));
    }

    #[test]
    fn test_max_pairwise_rejects_non_finite() {
        assert_eq!(max_abs_pairwise_difference(&[60.0, f64::NAN]), None);
        assert_eq!(max_abs_pairwise_difference(&[f64::NAN, 60.0, 61.0]), None);
        assert_eq!(max_abs_pairwise_difference(&[60.0, f64::INFINITY]), None);
    }
}
