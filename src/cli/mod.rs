//! Command-line parsing for the RPCA anomaly detector.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numeric code. Detection flags are lowered into the same `RpcaOption` list
//! the library entry points take.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::SampleSpec;
use crate::domain::{DEFAULT_FREQUENCY, RpcaOption};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rpca", version, about = "Time-series anomaly detection with Robust PCA")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect anomalies in CSV series, print a summary, and optionally plot/export.
    Detect(DetectArgs),
    /// Write a synthetic seasonal series with injected outliers.
    Sample(SampleArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
}

/// Decomposition settings shared by every analysed column.
#[derive(Debug, Args, Clone)]
pub struct RpcaArgs {
    /// Period length: points per row of the decomposed matrix.
    #[arg(short = 'f', long, default_value_t = DEFAULT_FREQUENCY)]
    pub frequency: usize,

    /// Never difference, even when the series looks non-stationary.
    #[arg(long)]
    pub no_autodiff: bool,

    /// Always difference the series before decomposing.
    #[arg(long)]
    pub forcediff: bool,

    /// Skip z-scoring.
    #[arg(long)]
    pub no_scale: bool,

    /// Low-rank penalty multiplier.
    #[arg(long, default_value_t = 1.0)]
    pub l_penalty: f64,

    /// Sparse penalty multiplier (default: 1.4 / sqrt(max(F, N / F))).
    #[arg(long)]
    pub s_penalty: Option<f64>,

    /// Lagged differences in the stationarity test (default: (N - 1)^(1/3)).
    #[arg(long)]
    pub adf_lag: Option<usize>,

    /// Include a linear trend in the stationarity test.
    #[arg(long)]
    pub adf_trend: bool,

    /// Log every solver iteration (also raises the log level to debug).
    #[arg(short = 'v', long, env = "RPCA_VERBOSE")]
    pub verbose: bool,
}

impl RpcaArgs {
    /// Lower the flags into detector options.
    ///
    /// `s_penalty` and `adf_lag` are only emitted when given so their
    /// derived defaults still apply.
    pub fn options(&self) -> Vec<RpcaOption> {
        let mut options = vec![
            RpcaOption::Frequency(self.frequency),
            RpcaOption::AutoDiff(!self.no_autodiff),
            RpcaOption::ForceDiff(self.forcediff),
            RpcaOption::Scale(!self.no_scale),
            RpcaOption::LPenalty(self.l_penalty),
            RpcaOption::Verbose(self.verbose),
            RpcaOption::AdfTrend(self.adf_trend),
        ];
        if let Some(s) = self.s_penalty {
            options.push(RpcaOption::SPenalty(s));
        }
        if let Some(lag) = self.adf_lag {
            options.push(RpcaOption::AdfLag(lag));
        }
        options
    }
}

/// Options for `rpca detect`.
#[derive(Debug, Parser, Clone)]
pub struct DetectArgs {
    /// Input CSV (header row; optional `date` column).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Series column(s) to analyse (repeatable; default: all value columns).
    #[arg(short = 'c', long = "column", value_name = "NAME")]
    pub columns: Vec<String>,

    #[command(flatten)]
    pub rpca: RpcaArgs,

    /// Show the top-N anomalies per series.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-point anomalies to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the L/S/E components to CSV.
    #[arg(long = "export-components")]
    pub export_components: Option<PathBuf>,

    /// Export the detection report to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for `rpca sample`.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    #[arg(short = 'f', long, default_value_t = DEFAULT_FREQUENCY)]
    pub frequency: usize,

    /// Number of full periods.
    #[arg(long, default_value_t = 12)]
    pub periods: usize,

    #[arg(long, default_value_t = 100.0)]
    pub level: f64,

    /// Seasonal amplitude.
    #[arg(long, default_value_t = 10.0)]
    pub amplitude: f64,

    /// Linear trend per step.
    #[arg(long, default_value_t = 0.0)]
    pub trend: f64,

    /// Gaussian noise standard deviation.
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Number of injected outliers.
    #[arg(long, default_value_t = 3)]
    pub outliers: usize,

    /// Size of each injected shift.
    #[arg(long, default_value_t = 30.0)]
    pub magnitude: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Output CSV (default: stdout).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl SampleArgs {
    pub fn spec(&self) -> SampleSpec {
        SampleSpec {
            frequency: self.frequency,
            periods: self.periods,
            level: self.level,
            amplitude: self.amplitude,
            trend: self.trend,
            noise_sd: self.noise,
            outliers: self.outliers,
            outlier_magnitude: self.magnitude,
            seed: self.seed,
            start_date: self.start,
        }
    }
}

/// Options for plotting a saved report.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Report JSON file produced by `rpca detect --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
