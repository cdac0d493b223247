//! Period matrices and the dense-matrix operations the engine needs.
//!
//! A series of length `N` with frequency `F` is folded into an `F x (N / F)`
//! matrix where element `(r, c)` is `series[c * F + r]`: each column holds one
//! full period. nalgebra stores matrices column-major, so the folded layout is
//! exactly the series order in memory and unravelling is a plain copy.

use nalgebra::DMatrix;
use nalgebra::linalg::SVD;

use crate::error::RpcaError;
use crate::math::threshold::soft_threshold;

/// Iteration cap handed to nalgebra's SVD.
pub(crate) const SVD_MAX_ITERS: usize = 100_000;

/// Fold `series` into a `frequency x (len / frequency)` period matrix.
pub fn reshape(series: &[f64], frequency: usize) -> Result<DMatrix<f64>, RpcaError> {
    if frequency == 0 {
        return Err(RpcaError::InvalidFrequency { frequency });
    }
    if series.len() % frequency != 0 {
        return Err(RpcaError::NotDivisible {
            len: series.len(),
            frequency,
        });
    }
    Ok(DMatrix::from_column_slice(
        frequency,
        series.len() / frequency,
        series,
    ))
}

/// Inverse of [`reshape`]: the matrix elements back in series order.
pub fn unravel(matrix: &DMatrix<f64>) -> Vec<f64> {
    matrix.as_slice().to_vec()
}

/// Sum of absolute values of all elements.
pub fn l1_norm(matrix: &DMatrix<f64>) -> f64 {
    matrix.iter().map(|v| v.abs()).sum()
}

/// Operator 2-norm (largest singular value).
pub fn spectral_norm(matrix: &DMatrix<f64>) -> Result<f64, RpcaError> {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 {
        return Ok(0.0);
    }
    let svd = matrix
        .clone()
        .try_svd(false, false, f64::EPSILON, SVD_MAX_ITERS)
        .ok_or(RpcaError::SvdFailed { rows, cols })?;
    Ok(svd.singular_values.iter().fold(0.0_f64, |acc, &s| acc.max(s)))
}

/// Singular value soft-thresholding.
///
/// Factorizes `matrix = U Σ Vᵗ`, shrinks Σ by `threshold` and returns the
/// reconstruction `U · diag(shrunk Σ) · Vᵗ` together with the sum of the shrunk
/// singular values. An all-zero input yields a zero reconstruction.
pub fn singular_value_threshold(
    matrix: DMatrix<f64>,
    threshold: f64,
) -> Result<(DMatrix<f64>, f64), RpcaError> {
    let (rows, cols) = matrix.shape();
    let failed = RpcaError::SvdFailed { rows, cols };

    let SVD {
        u,
        v_t,
        singular_values,
    } = matrix
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERS)
        .ok_or_else(|| failed.clone())?;
    let (Some(u), Some(v_t)) = (u, v_t) else {
        return Err(failed);
    };

    let shrunk = singular_values.map(|s| soft_threshold(s, threshold));
    let shrunk_sum = shrunk.sum();
    let reconstructed = u * DMatrix::from_diagonal(&shrunk) * v_t;
    Ok((reconstructed, shrunk_sum))
}
