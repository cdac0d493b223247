//! Ordinary least squares through the SVD.
//!
//! With `X = U Σ Vᵗ` the solution is `β = V Σ⁻¹ Uᵗ y`, and the coefficient
//! covariance up to the residual variance is `(XᵗX)⁻¹ = V Σ⁻² Vᵗ`. Both come
//! from one factorization, so `XᵗX` is never formed.

use nalgebra::{DMatrix, DVector};

use crate::math::matrix::SVD_MAX_ITERS;

/// Singular values below this fraction of the largest one mark the design as
/// rank deficient.
const RANK_TOLERANCE: f64 = 1e-10;

/// A full-rank least-squares fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub beta: DVector<f64>,
    pub residuals: DVector<f64>,
    /// Diagonal of `(XᵗX)⁻¹`.
    pub inverse_gram_diagonal: DVector<f64>,
}

impl OlsFit {
    pub fn sse(&self) -> f64 {
        self.residuals.norm_squared()
    }
}

/// Fit `y ≈ X β`.
///
/// Returns `None` when the design is rank deficient or the factorization
/// fails.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let (rows, cols) = x.shape();
    if rows < cols || cols == 0 || y.len() != rows {
        return None;
    }

    let svd = x.clone().try_svd(true, true, f64::EPSILON, SVD_MAX_ITERS)?;
    let sigma_max = svd.singular_values.max();
    let sigma_min = svd.singular_values.min();
    if !(sigma_max.is_finite() && sigma_min > RANK_TOLERANCE * sigma_max) {
        return None;
    }

    let beta = svd.solve(y, RANK_TOLERANCE * sigma_max).ok()?;
    if !beta.iter().all(|v| v.is_finite()) {
        return None;
    }

    let v_t = svd.v_t.as_ref()?;
    let inverse_gram_diagonal = DVector::from_fn(cols, |j, _| {
        svd.singular_values
            .iter()
            .enumerate()
            .map(|(k, s)| (v_t[(k, j)] / s).powi(2))
            .sum()
    });

    let residuals = y - x * &beta;
    Some(OlsFit {
        beta,
        residuals,
        inverse_gram_diagonal,
    })
}
