//! Stable Principal Component Pursuit decomposition.
//!
//! Solves
//!
//! ```text
//! minimize ½‖E‖²_F + λ_L‖L‖_* + λ_S‖S‖₁   subject to   M = L + S + E
//! ```
//!
//! by alternating proximal steps:
//!
//! - sparse: `S = soft(M - L, μ·s_penalty)`
//! - low-rank: `L = U · soft(Σ, μ·l_penalty) · Vᵗ` where `M - S = U Σ Vᵗ`
//! - noise: `E = M - L - S`
//!
//! μ starts at `rows·cols / (4‖M‖₁)` and is recomputed after every iteration
//! from the spread of E. Iteration stops once the objective moves by less
//! than `1e-8` of its initial value, or after [`MAX_ITERS`] iterations.

use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::domain::{DecomposedResult, IterationTrace, MAX_ITERS, RpcaConfig};
use crate::error::RpcaError;
use crate::math::{
    l1_norm, reshape, singular_value_threshold, soft_threshold_matrix, spectral_norm, std_dev,
};
use crate::rpca::normalize::normalize;
use crate::rpca::preprocess::preprocess;

/// Relative objective tolerance.
const TOLERANCE: f64 = 1e-8;

/// Floor for the dynamic convergence-rate parameter.
const MIN_MU: f64 = 0.01;

/// Components of one solved matrix, in the units the solver saw.
#[derive(Debug, Clone)]
pub struct Solution {
    pub l: DMatrix<f64>,
    pub s: DMatrix<f64>,
    pub e: DMatrix<f64>,
    pub converged: bool,
    pub iterations: usize,
}

/// Decompose `series` into low-rank, sparse and noise components.
///
/// When `config.verbose` is set, every iteration is logged at `debug` level.
pub fn decompose(series: &[f64], config: &RpcaConfig) -> Result<DecomposedResult, RpcaError> {
    let verbose = config.verbose;
    decompose_traced(series, config, |trace| {
        if verbose {
            log_iteration(trace);
        }
    })
}

/// [`decompose`] with an explicit per-iteration callback.
///
/// The callback observes the iteration; it cannot influence it.
pub fn decompose_traced<F>(
    series: &[f64],
    config: &RpcaConfig,
    on_iteration: F,
) -> Result<DecomposedResult, RpcaError>
where
    F: FnMut(&IterationTrace),
{
    validate_series(series)?;
    config.validate()?;
    // Fail fast on the shape before running the stationarity test.
    if series.len() % config.frequency != 0 {
        return Err(RpcaError::NotDivisible {
            len: series.len(),
            frequency: config.frequency,
        });
    }

    let prepared = preprocess(series, config);
    let mut matrix = reshape(&prepared.series, config.frequency)?;

    let scaling = if config.scale {
        Some(normalize(&mut matrix)?)
    } else {
        None
    };

    let (rows, cols) = matrix.shape();
    debug!(rows, cols, differenced = prepared.differenced, "decomposing");

    let solution = solve(&matrix, config.l_penalty, config.s_penalty, on_iteration)?;
    if !solution.converged {
        warn!(
            iterations = solution.iterations,
            "decomposition stopped at the iteration cap without converging"
        );
    }

    let Solution {
        l,
        s,
        e,
        converged,
        iterations,
    } = solution;
    let s_normed = s.clone();

    let (l, s, e) = match &scaling {
        Some(scaling) => (
            scaling.restore_level(&l),
            scaling.restore_deviation(&s),
            scaling.restore_deviation(&e),
        ),
        None => (l, s, e),
    };

    Ok(DecomposedResult {
        l,
        s,
        s_normed,
        e,
        converged,
        iterations,
        differenced: prepared.differenced,
        scaling,
    })
}

/// Run the fixed-point iteration on an already prepared matrix.
pub fn solve<F>(
    matrix: &DMatrix<f64>,
    l_penalty: f64,
    s_penalty: f64,
    mut on_iteration: F,
) -> Result<Solution, RpcaError>
where
    F: FnMut(&IterationTrace),
{
    let (rows, cols) = matrix.shape();

    let mut mu = (rows * cols) as f64 / (4.0 * l1_norm(matrix));
    let mut l = DMatrix::<f64>::zeros(rows, cols);
    let mut s = DMatrix::<f64>::zeros(rows, cols);
    let mut e = DMatrix::<f64>::zeros(rows, cols);

    let mut previous_objective = 0.5 * spectral_norm(matrix)?.powi(2);
    // Absolute tolerance, fixed from the initial objective.
    let total = TOLERANCE * previous_objective;
    let mut difference = 2.0 * total;
    let mut iterations = 0;

    while difference > total && iterations < MAX_ITERS {
        let this_l_penalty = mu * l_penalty;
        let this_s_penalty = mu * s_penalty;

        s = soft_threshold_matrix(&(matrix - &l), this_s_penalty);
        let s_norm = l1_norm(&s) * this_s_penalty;

        let (low_rank, shrunk_sum) = singular_value_threshold(matrix - &s, this_l_penalty)?;
        l = low_rank;
        let l_norm = shrunk_sum * this_l_penalty;

        e = matrix - &l - &s;
        let e_norm = spectral_norm(&e)?.powi(2);

        let objective = 0.5 * e_norm + l_norm + s_norm;
        difference = (previous_objective - objective).abs();
        previous_objective = objective;

        let next_mu = dynamic_mu(&e);
        on_iteration(&IterationTrace {
            iteration: iterations,
            mu,
            l_penalty: this_l_penalty,
            s_penalty: this_s_penalty,
            l_norm,
            s_norm,
            e_norm,
            objective,
            difference,
            next_mu,
        });

        mu = next_mu;
        iterations += 1;
    }

    Ok(Solution {
        l,
        s,
        e,
        converged: iterations < MAX_ITERS,
        iterations,
    })
}

/// `max(0.01, σ(E)·sqrt(2·max(rows, cols)))`.
fn dynamic_mu(e: &DMatrix<f64>) -> f64 {
    let (rows, cols) = e.shape();
    let spread = std_dev(e.as_slice());
    (spread * (2.0 * rows.max(cols) as f64).sqrt()).max(MIN_MU)
}

fn validate_series(series: &[f64]) -> Result<(), RpcaError> {
    if series.is_empty() {
        return Err(RpcaError::EmptySeries);
    }
    if let Some(index) = series.iter().position(|v| !v.is_finite()) {
        return Err(RpcaError::NonFiniteValue { index });
    }
    Ok(())
}

fn log_iteration(trace: &IterationTrace) {
    debug!(
        iteration = trace.iteration,
        mu = trace.mu,
        l_penalty = trace.l_penalty,
        s_penalty = trace.s_penalty,
        l_norm = trace.l_norm,
        s_norm = trace.s_norm,
        e_norm = trace.e_norm,
        objective = trace.objective,
        difference = trace.difference,
        "rpca iteration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RpcaOption;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn seasonal(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 10.0 + 2.0 * (2.0 * PI * i as f64 / 7.0).sin())
            .collect()
    }

    fn assert_reconstructs(result: &DecomposedResult, expected: &DMatrix<f64>) {
        let sum = &result.l + &result.s + &result.e;
        assert_eq!(sum.shape(), expected.shape());
        let max_err = (sum - expected).iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(max_err < 1e-8, "max reconstruction error {max_err}");
    }

    #[test]
    fn decomposition_keeps_period_shape_and_reconstructs() {
        let mut series = seasonal(70);
        series[30] += 8.0;
        let config = RpcaConfig::resolve(series.len(), &[RpcaOption::AutoDiff(false)]);
        let result = decompose(&series, &config).unwrap();

        assert_eq!(result.shape(), (7, 10));
        assert!(result.converged);
        assert!(result.iterations > 0 && result.iterations < MAX_ITERS);
        assert!(!result.differenced);

        let original = reshape(&series, 7).unwrap();
        assert_reconstructs(&result, &original);
    }

    #[test]
    fn normalized_sparse_component_is_pre_rescale() {
        let mut series = seasonal(70);
        series[30] += 8.0;
        let config = RpcaConfig::resolve(series.len(), &[RpcaOption::AutoDiff(false)]);
        let result = decompose(&series, &config).unwrap();

        let scaling = result.scaling.expect("scale defaults to on");
        let rescaled = &result.s_normed * scaling.std_dev;
        assert!((rescaled - &result.s).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn differenced_decomposition_reconstructs_differenced_matrix() {
        let series: Vec<f64> = (0..70)
            .map(|i| 0.5 * i as f64 + 2.0 * (2.0 * PI * i as f64 / 7.0).sin())
            .collect();
        let config = RpcaConfig::resolve(
            series.len(),
            &[RpcaOption::ForceDiff(true), RpcaOption::Scale(false)],
        );
        let result = decompose(&series, &config).unwrap();

        assert!(result.differenced);
        assert!(result.scaling.is_none());
        let diffed = crate::rpca::first_difference(&series);
        assert_reconstructs(&result, &reshape(&diffed, 7).unwrap());
    }

    #[test]
    fn trace_callback_sees_every_iteration() {
        let series = seasonal(70);
        let config = RpcaConfig::resolve(series.len(), &[RpcaOption::AutoDiff(false)]);
        let mut traces = Vec::new();
        let result = decompose_traced(&series, &config, |t| traces.push(*t)).unwrap();

        assert_eq!(traces.len(), result.iterations);
        for (i, t) in traces.iter().enumerate() {
            assert_eq!(t.iteration, i);
            assert!(t.next_mu >= MIN_MU);
            assert!((t.l_penalty - t.mu * config.l_penalty).abs() < 1e-12);
            assert!((t.s_penalty - t.mu * config.s_penalty).abs() < 1e-12);
        }
        for pair in traces.windows(2) {
            assert_eq!(pair[1].mu, pair[0].next_mu);
        }
    }

    #[test]
    fn all_zero_matrix_converges_immediately() {
        let series = vec![0.0; 14];
        let config = RpcaConfig::resolve(
            series.len(),
            &[RpcaOption::AutoDiff(false), RpcaOption::Scale(false)],
        );
        let result = decompose(&series, &config).unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.converged);
        assert!(result.s.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn invalid_inputs_fail_before_matrix_work() {
        let config = RpcaConfig::resolve(10, &[RpcaOption::Frequency(0)]);
        assert_eq!(
            decompose(&[1.0; 10], &config).unwrap_err(),
            RpcaError::InvalidFrequency { frequency: 0 }
        );

        let config = RpcaConfig::resolve(10, &[RpcaOption::Frequency(3)]);
        assert_eq!(
            decompose(&[1.0; 10], &config).unwrap_err(),
            RpcaError::NotDivisible { len: 10, frequency: 3 }
        );

        let config = RpcaConfig::resolve(0, &[]);
        assert_eq!(decompose(&[], &config).unwrap_err(), RpcaError::EmptySeries);

        let mut series = seasonal(14);
        series[3] = f64::NAN;
        let config = RpcaConfig::resolve(14, &[]);
        assert_eq!(
            decompose(&series, &config).unwrap_err(),
            RpcaError::NonFiniteValue { index: 3 }
        );
    }

    #[test]
    fn constant_series_cannot_be_scaled() {
        let config = RpcaConfig::resolve(14, &[RpcaOption::AutoDiff(false)]);
        assert_eq!(
            decompose(&[1.0; 14], &config).unwrap_err(),
            RpcaError::DegenerateScale { std_dev: 0.0 }
        );
    }

    #[test]
    fn iteration_cap_returns_best_effort_components() {
        // Tiny penalties on unstructured noise keep the objective moving.
        let options = [
            RpcaOption::AutoDiff(false),
            RpcaOption::Scale(false),
            RpcaOption::LPenalty(0.05),
            RpcaOption::SPenalty(0.05),
        ];
        let mut capped = 0;
        for seed in 0..8 {
            let noise = crate::data::fixtures::uniform_noise(seed, 14);
            let config = RpcaConfig::resolve(noise.len(), &options);
            let mut traces = 0;
            let result = decompose_traced(&noise, &config, |_| traces += 1).unwrap();

            assert_eq!(traces, result.iterations);
            assert_eq!(result.converged, result.iterations < MAX_ITERS);
            assert_reconstructs(&result, &reshape(&noise, 7).unwrap());
            if result.iterations == MAX_ITERS {
                assert!(!result.converged);
                assert!(result.l.iter().chain(result.s.iter()).all(|v| v.is_finite()));
                capped += 1;
            }
        }
        assert!(capped > 0, "no seed reached the iteration cap");
    }

    #[test]
    fn solve_stops_at_the_cap_on_noise() {
        let mut capped = 0;
        for seed in 0..8 {
            let noise = crate::data::fixtures::uniform_noise(seed, 14);
            let m = DMatrix::from_column_slice(7, 2, &noise);
            let sol = solve(&m, 0.05, 0.05, |_| {}).unwrap();

            let max_err = (&sol.l + &sol.s + &sol.e - &m)
                .iter()
                .fold(0.0_f64, |acc, v| acc.max(v.abs()));
            assert!(max_err < 1e-8, "seed {seed}: reconstruction error {max_err}");
            if sol.iterations == MAX_ITERS {
                assert!(!sol.converged);
                capped += 1;
            }
        }
        assert!(capped > 0, "no seed reached the iteration cap");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn any_valid_series_terminates_and_reconstructs(
            frequency in 1usize..6,
            periods in 1usize..6,
            values in prop::collection::vec(-100.0f64..100.0, 36),
            scale in any::<bool>(),
        ) {
            let series = &values[..frequency * periods];
            let config = RpcaConfig::resolve(
                series.len(),
                &[
                    RpcaOption::Frequency(frequency),
                    RpcaOption::AutoDiff(false),
                    RpcaOption::Scale(scale),
                ],
            );
            match decompose(series, &config) {
                Ok(result) => {
                    prop_assert_eq!(result.shape(), (frequency, periods));
                    prop_assert!(result.iterations <= MAX_ITERS);
                    prop_assert_eq!(result.converged, result.iterations < MAX_ITERS);

                    let original = reshape(series, frequency).unwrap();
                    let sum = &result.l + &result.s + &result.e;
                    let tol = 1e-6 * (1.0 + original.amax());
                    prop_assert!((sum - original).iter().all(|v| v.abs() < tol));
                }
                // Single-point or constant inputs cannot be z-scored.
                Err(RpcaError::DegenerateScale { .. }) => prop_assert!(scale),
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }
}
