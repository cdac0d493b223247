//! Stationarity-driven differencing.
//!
//! Differencing must happen before reshaping. The differenced series is
//! left-padded with a `0` so its length (and therefore divisibility by the
//! frequency) is unchanged.

use tracing::debug;

use crate::domain::RpcaConfig;
use crate::stationarity::{AdfOutcome, adf_test};

/// Series handed to the reshaper, plus how it was derived.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub series: Vec<f64>,
    pub differenced: bool,
    /// Present when the stationarity test actually ran.
    pub adf: Option<AdfOutcome>,
}

/// First difference of `series`, left-padded with a leading zero.
pub fn first_difference(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(series.len());
    out.push(0.0);
    out.extend(series.windows(2).map(|w| w[1] - w[0]));
    out
}

/// Decide whether to difference and apply it.
///
/// - `forcediff`: always difference (the test is skipped)
/// - `autodiff`: difference iff the ADF test finds a unit root
/// - otherwise: leave the series untouched
pub fn preprocess(series: &[f64], config: &RpcaConfig) -> Preprocessed {
    let (differenced, adf) = if config.forcediff {
        (true, None)
    } else if config.autodiff {
        let outcome = adf_test(series, &config.stationarity);
        debug!(
            statistic = outcome.statistic,
            critical_value = outcome.critical_value,
            lag = outcome.lag,
            stationary = outcome.is_stationary,
            "ADF stationarity test"
        );
        (!outcome.is_stationary, Some(outcome))
    } else {
        (false, None)
    };

    let series = if differenced {
        debug!(len = series.len(), "differencing series");
        first_difference(series)
    } else {
        series.to_vec()
    };

    Preprocessed {
        series,
        differenced,
        adf,
    }
}
