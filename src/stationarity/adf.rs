//! Augmented Dickey–Fuller test.
//!
//! Regression (ordinary least squares, solved through the SVD):
//!
//! ```text
//! Δy_t = α [+ δ·t] + β·y_{t-1} + Σ_{i=1..p} γ_i·Δy_{t-i} + ε_t
//! ```
//!
//! H0: unit root (β = 0, non-stationary). The test statistic is the t-ratio
//! of β, compared against the 5% MacKinnon critical value with its
//! finite-sample correction.
//!
//! Degenerate regressions (too few observations, a rank-deficient design,
//! or an exact fit with no residual variance) cannot reject H0 and are
//! reported as non-stationary.

use nalgebra::{DMatrix, DVector};

use crate::domain::AdfOptions;
use crate::math::fit_ols;

/// Result of one ADF run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfOutcome {
    /// t-ratio of the lagged level coefficient; `NaN` when degenerate.
    pub statistic: f64,
    /// 5% critical value for this regression size.
    pub critical_value: f64,
    /// Lag order actually used.
    pub lag: usize,
    /// Observations in the test regression.
    pub nobs: usize,
    pub is_stationary: bool,
}

impl AdfOutcome {
    fn degenerate(lag: usize, nobs: usize, trend: bool) -> Self {
        Self {
            statistic: f64::NAN,
            critical_value: critical_value_5pct(nobs, trend),
            lag,
            nobs,
            is_stationary: false,
        }
    }
}

/// Default lag order `floor((n - 1)^(1/3))`.
pub fn default_lag(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    ((n - 1) as f64).cbrt().floor() as usize
}

/// 5% critical value (MacKinnon 2010 response surface, `T` observations).
pub fn critical_value_5pct(nobs: usize, trend: bool) -> f64 {
    let t = nobs.max(1) as f64;
    if trend {
        -3.4126 - 4.039 / t - 17.83 / (t * t)
    } else {
        -2.8621 - 2.738 / t - 8.36 / (t * t)
    }
}

/// Run the ADF test on `series`.
pub fn adf_test(series: &[f64], opts: &AdfOptions) -> AdfOutcome {
    let n = series.len();
    let lag = opts.lag.unwrap_or_else(|| default_lag(n));
    let n_regressors = 2 + usize::from(opts.trend) + lag;

    // Δy has n - 1 entries; the first `lag` of them only feed the lag terms.
    let nobs = n.saturating_sub(1).saturating_sub(lag);
    if nobs <= n_regressors {
        return AdfOutcome::degenerate(lag, nobs, opts.trend);
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut x = DMatrix::<f64>::zeros(nobs, n_regressors);
    let mut y = DVector::<f64>::zeros(nobs);
    // Columns: [1, y_{t-1}, (t), Δy_{t-1}, ..., Δy_{t-p}]. With Δy_t stored as
    // diff[t] = series[t + 1] - series[t], the level preceding diff[t] is series[t].
    let lag_start = n_regressors - lag;
    for (row, t) in (lag..diff.len()).enumerate() {
        x[(row, 0)] = 1.0;
        x[(row, 1)] = series[t];
        if opts.trend {
            x[(row, 2)] = t as f64;
        }
        for i in 1..=lag {
            x[(row, lag_start + i - 1)] = diff[t - i];
        }
        y[row] = diff[t];
    }

    let Some(fit) = fit_ols(&x, &y) else {
        return AdfOutcome::degenerate(lag, nobs, opts.trend);
    };
    let mse = fit.sse() / (nobs - n_regressors) as f64;
    let var_beta = mse * fit.inverse_gram_diagonal[1];
    // Exact fit: residual variance is rounding noise relative to Δy itself.
    let response_scale = y.norm_squared() / nobs as f64;
    let exact_fit = mse <= f64::EPSILON * response_scale.max(f64::MIN_POSITIVE);
    if !(mse.is_finite() && var_beta > 0.0) || exact_fit {
        return AdfOutcome::degenerate(lag, nobs, opts.trend);
    }

    let statistic = fit.beta[1] / var_beta.sqrt();
    let critical_value = critical_value_5pct(nobs, opts.trend);

    AdfOutcome {
        statistic,
        critical_value,
        lag,
        nobs,
        is_stationary: statistic.is_finite() && statistic < critical_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{random_walk, uniform_noise};
    use std::ops::Range;

    /// Seeds (out of `seeds`) whose series the test calls stationary.
    fn stationary_count(seeds: Range<u64>, series: impl Fn(u64) -> Vec<f64>) -> usize {
        seeds
            .filter(|&seed| adf_test(&series(seed), &AdfOptions::default()).is_stationary)
            .count()
    }

    #[test]
    fn default_lag_is_cube_root() {
        assert_eq!(default_lag(98), 4);
        assert_eq!(default_lag(28), 3);
        assert_eq!(default_lag(1), 0);
    }

    #[test]
    fn white_noise_is_stationary() {
        let out = adf_test(&uniform_noise(7, 98), &AdfOptions::default());
        assert_eq!(out.lag, 4);
        assert_eq!(out.nobs, 93);
        assert!(out.statistic.is_finite());

        // The test has high power against iid noise; allow a stray miss.
        let hits = stationary_count(0..20, |seed| uniform_noise(seed, 98));
        assert!(hits >= 18, "{hits}/20 noise series stationary");
    }

    #[test]
    fn random_walk_is_not_stationary() {
        let out = adf_test(&random_walk(7, 98), &AdfOptions::default());
        assert!(out.statistic.is_finite());

        // Nominal size is 5%, so a few false rejections are expected.
        let hits = stationary_count(0..20, |seed| random_walk(seed, 98));
        assert!(hits <= 5, "{hits}/20 random walks stationary");
    }

    #[test]
    fn trend_term_absorbs_deterministic_trend() {
        let noise = uniform_noise(42, 98);
        let series: Vec<f64> = noise
            .iter()
            .enumerate()
            .map(|(i, e)| {
                0.3 * i as f64
                    + 2.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin()
                    + 0.5 * e
            })
            .collect();

        let level_only = adf_test(&series, &AdfOptions::default());
        assert!(!level_only.is_stationary, "statistic {}", level_only.statistic);

        let with_trend = adf_test(&series, &AdfOptions { lag: None, trend: true });
        assert!(with_trend.is_stationary, "statistic {}", with_trend.statistic);
    }

    #[test]
    fn short_or_constant_series_cannot_reject_unit_root() {
        let short = adf_test(&[1.0, 2.0, 3.0], &AdfOptions::default());
        assert!(!short.is_stationary);
        assert!(short.statistic.is_nan());

        let flat = adf_test(&[5.0; 40], &AdfOptions::default());
        assert!(!flat.is_stationary);
        assert!(flat.statistic.is_nan());
    }

    #[test]
    fn rank_deficient_design_is_degenerate() {
        // Δy is constant, so every lagged-difference column equals the intercept.
        let ramp: Vec<f64> = (0..40).map(|i| 2.0 * i as f64).collect();
        let out = adf_test(&ramp, &AdfOptions::default());
        assert!(out.statistic.is_nan());
        assert!(!out.is_stationary);
        assert_eq!(out.lag, 3);
    }
}
