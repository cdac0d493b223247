//! Z-scoring of the period matrix and its inverse.

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::Scaling;
use crate::error::RpcaError;
use crate::math::mean_std_dev;

/// Subtract the mean and divide by the population standard deviation, in place.
///
/// Fails with `DegenerateScale` when the spread is numerically zero rather
/// than letting `Inf`/`NaN` reach the iteration.
pub fn normalize(matrix: &mut DMatrix<f64>) -> Result<Scaling, RpcaError> {
    let (mean, std_dev) = mean_std_dev(matrix.as_slice());
    if !(std_dev.is_finite() && std_dev > f64::EPSILON * mean.abs().max(1.0)) {
        return Err(RpcaError::DegenerateScale { std_dev });
    }
    debug!(mean, std_dev, "scaling matrix");

    matrix.apply(|v| *v = (*v - mean) / std_dev);
    Ok(Scaling { mean, std_dev })
}

impl Scaling {
    /// Map a level (low-rank) matrix back to input units: `x·σ + μ`.
    pub fn restore_level(&self, matrix: &DMatrix<f64>) -> DMatrix<f64> {
        (matrix * self.std_dev).add_scalar(self.mean)
    }

    /// Map a deviation (sparse or noise) matrix back to input units: `x·σ`.
    pub fn restore_deviation(&self, matrix: &DMatrix<f64>) -> DMatrix<f64> {
        matrix * self.std_dev
    }
}
