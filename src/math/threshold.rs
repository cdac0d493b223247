//! Soft-thresholding (the proximal operator of the L1 norm).
//!
//! ```text
//! soft(x, t) = sign(x) * max(|x| - t, 0)
//! ```
//!
//! Applied elementwise it drives the sparse update; applied to a singular
//! value vector it drives the low-rank update.

use nalgebra::DMatrix;

/// Sign of `x` with `sign(0) = 0`.
///
/// `f64::signum` returns `1.0` for `+0.0`, which would turn exact zeros into
/// spurious anomalies.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Shrink `x` toward zero by `threshold`, flooring at zero.
pub fn soft_threshold(x: f64, threshold: f64) -> f64 {
    sign(x) * (x.abs() - threshold).max(0.0)
}

/// Elementwise [`soft_threshold`] over a matrix.
pub fn soft_threshold_matrix(matrix: &DMatrix<f64>, threshold: f64) -> DMatrix<f64> {
    matrix.map(|x| soft_threshold(x, threshold))
}
