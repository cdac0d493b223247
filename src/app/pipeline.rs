//! Shared "detect pipeline" logic.
//!
//! CSV ingest -> per-column config resolution -> decomposition -> anomalies
//!
//! Columns are independent, so they are decomposed in parallel; the output
//! keeps the file's column order.

use std::path::Path;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{
    DecomposedResult, DecompositionSummary, DetectionReport, RpcaConfig, RpcaOption,
};
use crate::error::{AppError, RpcaError};
use crate::io::ingest::{IngestedSeries, SeriesColumn, load_series_csv};
use crate::rpca::decompose_or_flat;

/// Detection output for one column.
#[derive(Debug, Clone)]
pub struct SeriesRun {
    pub report: DetectionReport,
    /// `None` when the series was flat and the decomposition was skipped.
    pub decomposed: Option<DecomposedResult>,
}

/// All computed outputs of a single `rpca detect` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedSeries,
    pub runs: Vec<SeriesRun>,
}

impl RunOutput {
    pub fn reports(&self) -> Vec<DetectionReport> {
        self.runs.iter().map(|r| r.report.clone()).collect()
    }

    /// `(column, components)` for every column that was decomposed.
    pub fn components(&self) -> Vec<(&str, &DecomposedResult)> {
        self.runs
            .iter()
            .filter_map(|r| r.decomposed.as_ref().map(|d| (r.report.column.as_str(), d)))
            .collect()
    }
}

/// Load a CSV and detect anomalies in the selected columns.
pub fn run_detect(
    path: &Path,
    columns: &[String],
    options: &[RpcaOption],
) -> Result<RunOutput, AppError> {
    let ingest = load_series_csv(path, columns)?;
    info!(
        rows = ingest.rows_read,
        columns = ingest.columns.len(),
        "loaded {}",
        path.display()
    );
    let runs = detect_columns(&ingest, options)?;
    Ok(RunOutput { ingest, runs })
}

/// Detect anomalies in every ingested column.
///
/// The first failing column (in file order) aborts the run.
pub fn detect_columns(
    ingest: &IngestedSeries,
    options: &[RpcaOption],
) -> Result<Vec<SeriesRun>, AppError> {
    ingest
        .columns
        .par_iter()
        .map(|column| {
            detect_column(column, ingest.dates.as_deref(), options).map_err(|err| {
                AppError::new(err.exit_code(), format!("Column `{}`: {err}", column.name))
            })
        })
        .collect()
}

fn detect_column(
    column: &SeriesColumn,
    dates: Option<&[NaiveDate]>,
    options: &[RpcaOption],
) -> Result<SeriesRun, RpcaError> {
    let config = RpcaConfig::resolve(column.values.len(), options);
    let (decomposed, anomalies) = decompose_or_flat(&column.values, &config)?;
    debug!(
        column = %column.name,
        anomalies = anomalies.count(),
        "column done"
    );

    let report = DetectionReport {
        tool: "rpca".to_string(),
        column: column.name.clone(),
        config,
        decomposition: decomposed.as_ref().map(DecompositionSummary::from),
        dates: dates.map(<[NaiveDate]>::to_vec),
        series: column.values.clone(),
        anomalies,
    };

    Ok(SeriesRun { report, decomposed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn ingest(columns: Vec<SeriesColumn>) -> IngestedSeries {
        let rows_read = columns.first().map_or(0, |c| c.values.len());
        IngestedSeries {
            dates: None,
            columns,
            rows_read,
        }
    }

    fn seasonal_with_spike(n: usize, spike_at: usize) -> Vec<f64> {
        let mut v: Vec<f64> = (0..n)
            .map(|i| 10.0 + 2.0 * (2.0 * PI * i as f64 / 7.0).sin())
            .collect();
        v[spike_at] += 8.0;
        v
    }

    #[test]
    fn flat_and_spiky_columns_in_one_run() {
        let data = ingest(vec![
            SeriesColumn {
                name: "spiky".to_string(),
                values: seasonal_with_spike(70, 30),
            },
            SeriesColumn {
                name: "flat".to_string(),
                values: vec![5.0; 70],
            },
        ]);
        let runs = detect_columns(&data, &[RpcaOption::AutoDiff(false)]).unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].report.column, "spiky");
        assert_eq!(runs[0].report.anomalies.indices(), vec![30]);
        assert!(runs[0].decomposed.is_some());
        assert!(runs[0].report.decomposition.is_some_and(|d| d.scaling.is_some()));

        assert!(runs[1].decomposed.is_none());
        assert!(runs[1].report.decomposition.is_none());
        assert_eq!(runs[1].report.anomalies.count(), 0);
    }

    #[test]
    fn default_options_run_the_stationarity_check() {
        let data = ingest(vec![SeriesColumn {
            name: "spiky".to_string(),
            values: seasonal_with_spike(70, 30),
        }]);
        let runs = detect_columns(&data, &[]).unwrap();

        let report = &runs[0].report;
        assert!(report.config.autodiff);
        assert!(report.decomposition.is_some_and(|d| !d.differenced));
        assert_eq!(report.anomalies.indices(), vec![30]);
    }

    #[test]
    fn column_errors_name_the_column() {
        let data = ingest(vec![SeriesColumn {
            name: "short".to_string(),
            values: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        }]);
        let err = detect_columns(&data, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Column `short`:"), "{err}");
    }

    #[test]
    fn run_detect_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        let mut csv = String::from("date,v\n");
        for (i, v) in seasonal_with_spike(70, 30).iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64);
            csv.push_str(&format!("{date},{v}\n"));
        }
        std::fs::write(&path, csv).unwrap();

        let out = run_detect(&path, &[], &[RpcaOption::AutoDiff(false)]).unwrap();
        assert_eq!(out.runs.len(), 1);
        let report = &out.runs[0].report;
        assert_eq!(report.anomalies.indices(), vec![30]);
        assert_eq!(report.label(30), "2024-01-31");
        assert_eq!(out.components().len(), 1);
    }
}
