//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built once per detection call from user overrides
//! - exported to JSON/CSV
//! - compared across independent series

use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::RpcaError;

/// The maximum number of iterations before the engine stops trying to converge.
pub const MAX_ITERS: usize = 1000;

/// Default period length (weekly seasonality on daily data).
pub const DEFAULT_FREQUENCY: usize = 7;

/// Numerator of the frequency-dependent sparse penalty default.
const S_PENALTY_SCALE: f64 = 1.4;

/// Options for the Augmented Dickey–Fuller stationarity test.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AdfOptions {
    /// Number of lagged differences in the test regression.
    ///
    /// `None` picks `floor((N - 1)^(1/3))`.
    pub lag: Option<usize>,
    /// Include a deterministic linear trend term in the regression.
    pub trend: bool,
}

/// Fully resolved decomposition settings.
///
/// Use [`RpcaConfig::resolve`] to build one from user overrides; the
/// `s_penalty` default depends on both the frequency and the series length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpcaConfig {
    /// Period length: rows of the reshaped matrix.
    pub frequency: usize,
    /// Difference the series when the stationarity test finds a unit root.
    pub autodiff: bool,
    /// Always difference the series.
    pub forcediff: bool,
    /// Z-score the matrix before decomposing.
    pub scale: bool,
    /// Multiplier for the nuclear-norm (low-rank) penalty.
    pub l_penalty: f64,
    /// Multiplier for the L1 (sparse) penalty.
    pub s_penalty: f64,
    /// Emit one `debug` event per iteration.
    pub verbose: bool,
    pub stationarity: AdfOptions,
}

impl Default for RpcaConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            autodiff: true,
            forcediff: false,
            scale: true,
            l_penalty: 1.0,
            s_penalty: S_PENALTY_SCALE,
            verbose: false,
            stationarity: AdfOptions::default(),
        }
    }
}

impl RpcaConfig {
    /// Resolve a configuration for a series of `series_len` points.
    ///
    /// Options are applied over the defaults, the sparse penalty is derived
    /// from the resulting frequency, and the options are applied a second time
    /// so an explicit [`RpcaOption::SPenalty`] always takes precedence.
    pub fn resolve(series_len: usize, options: &[RpcaOption]) -> Self {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }

        config.s_penalty = default_s_penalty(config.frequency, series_len);

        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Check the numeric settings that do not depend on the series.
    pub fn validate(&self) -> Result<(), RpcaError> {
        if self.frequency == 0 {
            return Err(RpcaError::InvalidFrequency {
                frequency: self.frequency,
            });
        }
        check_penalty("l_penalty", self.l_penalty)?;
        check_penalty("s_penalty", self.s_penalty)?;
        Ok(())
    }
}

/// `1.4 / sqrt(max(F, N / F))`.
///
/// Falls back to the bare scale when the frequency is zero; validation
/// rejects that configuration later.
pub fn default_s_penalty(frequency: usize, series_len: usize) -> f64 {
    if frequency == 0 {
        return S_PENALTY_SCALE;
    }
    let freq = frequency as f64;
    let periods = series_len as f64 / freq;
    S_PENALTY_SCALE / freq.max(periods).sqrt()
}

fn check_penalty(name: &'static str, value: f64) -> Result<(), RpcaError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RpcaError::InvalidPenalty { name, value })
    }
}

/// A single user override of one [`RpcaConfig`] field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RpcaOption {
    Frequency(usize),
    AutoDiff(bool),
    ForceDiff(bool),
    Scale(bool),
    LPenalty(f64),
    SPenalty(f64),
    Verbose(bool),
    AdfLag(usize),
    AdfTrend(bool),
}

impl RpcaOption {
    pub fn apply(&self, config: &mut RpcaConfig) {
        match *self {
            RpcaOption::Frequency(v) => config.frequency = v,
            RpcaOption::AutoDiff(v) => config.autodiff = v,
            RpcaOption::ForceDiff(v) => config.forcediff = v,
            RpcaOption::Scale(v) => config.scale = v,
            RpcaOption::LPenalty(v) => config.l_penalty = v,
            RpcaOption::SPenalty(v) => config.s_penalty = v,
            RpcaOption::Verbose(v) => config.verbose = v,
            RpcaOption::AdfLag(v) => config.stationarity.lag = Some(v),
            RpcaOption::AdfTrend(v) => config.stationarity.trend = v,
        }
    }
}

/// Moments removed by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub mean: f64,
    pub std_dev: f64,
}

/// Output of one decomposition.
///
/// All matrices have `frequency` rows and `N / frequency` columns, with
/// element `(r, c)` corresponding to series index `c * frequency + r`.
#[derive(Debug, Clone)]
pub struct DecomposedResult {
    /// Low-rank component, rescaled to input units and shifted by the mean.
    pub l: DMatrix<f64>,
    /// Sparse component, rescaled to input units.
    pub s: DMatrix<f64>,
    /// Sparse component in normalized (z-scored) units.
    pub s_normed: DMatrix<f64>,
    /// Residual noise, rescaled to input units.
    pub e: DMatrix<f64>,
    pub converged: bool,
    pub iterations: usize,
    /// The series was replaced by its first difference before reshaping.
    pub differenced: bool,
    /// Present when the matrix was z-scored.
    pub scaling: Option<Scaling>,
}

impl DecomposedResult {
    pub fn shape(&self) -> (usize, usize) {
        self.l.shape()
    }
}

/// Per-iteration diagnostics handed to the trace callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationTrace {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Convergence-rate parameter used for this iteration's penalties.
    pub mu: f64,
    pub l_penalty: f64,
    pub s_penalty: f64,
    pub l_norm: f64,
    pub s_norm: f64,
    pub e_norm: f64,
    pub objective: f64,
    pub difference: f64,
    /// μ recomputed from this iteration's noise, used by the next one.
    pub next_mu: f64,
}

/// Per-point anomaly flags in the original series order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anomalies {
    /// Which points of the series were anomalous.
    pub positions: Vec<bool>,
    /// Signed anomaly magnitude in series units; zero for normal points,
    /// negative for anomalously low points, positive for anomalously high.
    pub values: Vec<f64>,
    /// The same magnitudes in z-scored space, comparable across series.
    pub normed_values: Vec<f64>,
}

impl Anomalies {
    /// An all-clear result for `len` points.
    pub fn none(len: usize) -> Self {
        Self {
            positions: vec![false; len],
            values: vec![0.0; len],
            normed_values: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn count(&self) -> usize {
        self.positions.iter().filter(|&&p| p).count()
    }

    /// Indices of the anomalous points, in time order.
    pub fn indices(&self) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| if p { Some(i) } else { None })
            .collect()
    }
}

/// Decomposition metadata kept in a saved report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionSummary {
    pub converged: bool,
    pub iterations: usize,
    pub differenced: bool,
    pub scaling: Option<Scaling>,
}

impl From<&DecomposedResult> for DecompositionSummary {
    fn from(result: &DecomposedResult) -> Self {
        Self {
            converged: result.converged,
            iterations: result.iterations,
            differenced: result.differenced,
            scaling: result.scaling,
        }
    }
}

/// Portable per-series detection output (the JSON report schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub tool: String,
    /// Source column name.
    pub column: String,
    pub config: RpcaConfig,
    /// `None` when the series was flat and no decomposition ran.
    pub decomposition: Option<DecompositionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<NaiveDate>>,
    pub series: Vec<f64>,
    pub anomalies: Anomalies,
}

impl DetectionReport {
    /// Label for point `index`: its date when known, else the index.
    pub fn label(&self, index: usize) -> String {
        match self.dates.as_ref().and_then(|d| d.get(index)) {
            Some(date) => date.to_string(),
            None => index.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_derives_s_penalty_from_frequency() {
        let config = RpcaConfig::resolve(70, &[RpcaOption::Frequency(7)]);
        // max(7, 70 / 7) = 10
        assert!((config.s_penalty - 1.4 / 10f64.sqrt()).abs() < 1e-12);
        assert_eq!(config.frequency, 7);
        assert!(config.autodiff);
        assert!(config.scale);
    }

    #[test]
    fn explicit_s_penalty_wins_over_derived_default() {
        let config = RpcaConfig::resolve(
            70,
            &[RpcaOption::SPenalty(0.25), RpcaOption::Frequency(5)],
        );
        assert_eq!(config.s_penalty, 0.25);
        assert_eq!(config.frequency, 5);
    }

    #[test]
    fn later_options_override_earlier_ones() {
        let config = RpcaConfig::resolve(
            14,
            &[RpcaOption::Scale(false), RpcaOption::Scale(true), RpcaOption::AdfLag(2)],
        );
        assert!(config.scale);
        assert_eq!(config.stationarity.lag, Some(2));
    }

    #[test]
    fn validate_rejects_zero_frequency_and_bad_penalties() {
        let config = RpcaConfig::resolve(14, &[RpcaOption::Frequency(0)]);
        assert_eq!(
            config.validate(),
            Err(RpcaError::InvalidFrequency { frequency: 0 })
        );

        let config = RpcaConfig::resolve(14, &[RpcaOption::LPenalty(-1.0)]);
        assert!(matches!(
            config.validate(),
            Err(RpcaError::InvalidPenalty { name: "l_penalty", .. })
        ));

        let config = RpcaConfig::resolve(14, &[RpcaOption::SPenalty(f64::NAN)]);
        assert!(matches!(
            config.validate(),
            Err(RpcaError::InvalidPenalty { name: "s_penalty", .. })
        ));
    }

    #[test]
    fn anomalies_none_is_all_clear() {
        let a = Anomalies::none(4);
        assert_eq!(a.len(), 4);
        assert_eq!(a.count(), 0);
        assert!(a.indices().is_empty());
    }
}
