//! Synthetic seasonal series with injected outliers.
//!
//! ```text
//! y_i = level + trend·i + amplitude·sin(2πi / F) + ε_i,   ε_i ~ N(0, noise_sd²)
//! ```
//!
//! then `outliers` distinct points are shifted by `±outlier_magnitude`. The
//! generator is seeded, so the same parameters always yield the same series.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Parameters of a synthetic series.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub frequency: usize,
    pub periods: usize,
    pub level: f64,
    pub amplitude: f64,
    /// Added per step.
    pub trend: f64,
    pub noise_sd: f64,
    pub outliers: usize,
    pub outlier_magnitude: f64,
    pub seed: u64,
    pub start_date: NaiveDate,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            frequency: 7,
            periods: 12,
            level: 100.0,
            amplitude: 10.0,
            trend: 0.0,
            noise_sd: 0.5,
            outliers: 3,
            outlier_magnitude: 30.0,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }
}

/// A point that was deliberately displaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectedOutlier {
    pub index: usize,
    /// Signed displacement added to the clean value.
    pub shift: f64,
}

#[derive(Debug, Clone)]
pub struct SampleSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    /// Sorted by index.
    pub injected: Vec<InjectedOutlier>,
}

pub fn generate_series(spec: &SampleSpec) -> Result<SampleSeries, AppError> {
    if spec.frequency == 0 || spec.periods == 0 {
        return Err(AppError::new(2, "Sample frequency and periods must be > 0."));
    }
    let Some(n) = spec.frequency.checked_mul(spec.periods) else {
        return Err(AppError::new(
            2,
            format!(
                "Sample of {} periods x {} points is too large.",
                spec.periods, spec.frequency
            ),
        ));
    };
    if spec.outliers > n {
        return Err(AppError::new(
            2,
            format!("Cannot inject {} outliers into {n} points.", spec.outliers),
        ));
    }
    if !(spec.noise_sd.is_finite() && spec.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }
    if ![spec.level, spec.amplitude, spec.trend, spec.outlier_magnitude]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(AppError::new(2, "Sample parameters must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let freq = spec.frequency as f64;
    let mut values: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            let seasonal = spec.amplitude * (2.0 * std::f64::consts::PI * t / freq).sin();
            spec.level + spec.trend * t + seasonal + noise.sample(&mut rng)
        })
        .collect();

    let mut indices = rand::seq::index::sample(&mut rng, n, spec.outliers).into_vec();
    indices.sort_unstable();
    let injected: Vec<InjectedOutlier> = indices
        .into_iter()
        .map(|index| {
            let shift = if rng.gen_bool(0.5) {
                spec.outlier_magnitude
            } else {
                -spec.outlier_magnitude
            };
            values[index] += shift;
            InjectedOutlier { index, shift }
        })
        .collect();

    let dates = (0..n)
        .map(|i| {
            spec.start_date
                .checked_add_signed(Duration::days(i as i64))
                .unwrap_or(spec.start_date)
        })
        .collect();

    Ok(SampleSeries {
        dates,
        values,
        injected,
    })
}
