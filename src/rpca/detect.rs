//! Public detection entry points.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Anomalies, DecomposedResult, RpcaConfig, RpcaOption};
use crate::error::RpcaError;
use crate::rpca::engine::decompose;
use crate::rpca::extract::extract_anomalies;

/// Detect anomalies in `series`.
///
/// Options override the defaults of [`RpcaConfig`]; see
/// [`RpcaConfig::resolve`] for how the frequency-dependent sparse penalty is
/// derived.
pub fn find_anomalies(series: &[f64], options: &[RpcaOption]) -> Result<Anomalies, RpcaError> {
    let config = RpcaConfig::resolve(series.len(), options);
    find_anomalies_with_config(series, &config)
}

/// Detect anomalies with an already resolved configuration.
pub fn find_anomalies_with_config(
    series: &[f64],
    config: &RpcaConfig,
) -> Result<Anomalies, RpcaError> {
    decompose_or_flat(series, config).map(|(_, anomalies)| anomalies)
}

/// Decompose `series` and extract its anomalies.
///
/// A series with no spread after preprocessing has an identically zero sparse
/// component, so the normalizer's `DegenerateScale` is reported as an
/// all-clear result with no decomposition.
pub fn decompose_or_flat(
    series: &[f64],
    config: &RpcaConfig,
) -> Result<(Option<DecomposedResult>, Anomalies), RpcaError> {
    match decompose(series, config) {
        Ok(decomposed) => {
            let anomalies = extract_anomalies(&decomposed);
            Ok((Some(decomposed), anomalies))
        }
        Err(RpcaError::DegenerateScale { std_dev }) => {
            debug!(std_dev, len = series.len(), "flat series, no anomalies");
            Ok((None, Anomalies::none(series.len())))
        }
        Err(err) => Err(err),
    }
}

/// Detect anomalies in independent series in parallel.
///
/// Each series resolves its own configuration from `options`, so derived
/// defaults follow each series' length. Results keep the input order.
pub fn find_anomalies_batch(
    series_set: &[Vec<f64>],
    options: &[RpcaOption],
) -> Vec<Result<Anomalies, RpcaError>> {
    series_set
        .par_iter()
        .map(|series| find_anomalies(series, options))
        .collect()
}
