//! Descriptive statistics over flat samples (population formulation).

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`); `0.0` for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    mean_std_dev(values).1
}

/// Mean and population standard deviation in one pass over the data.
pub fn mean_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    (m, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_moments() {
        let (m, s) = mean_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((m - 5.0).abs() < 1e-12);
        assert!((s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_sample_has_zero_spread() {
        assert_eq!(std_dev(&[3.0; 10]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }
}
