//! CSV exports.
//!
//! All exports are long-format (one row per series point) so several series
//! can share a file and still be pivoted in a spreadsheet.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::SampleSeries;
use crate::domain::{DecomposedResult, DetectionReport};
use crate::error::AppError;
use crate::math::unravel;

/// Write `column,index,date,value,anomaly,magnitude,normed_magnitude` rows.
pub fn write_anomalies_csv(path: &Path, reports: &[DetectionReport]) -> Result<(), AppError> {
    let file = create(path, "anomalies CSV")?;
    write_anomalies(file, reports)
}

pub fn write_anomalies<W: Write>(out: W, reports: &[DetectionReport]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            "column",
            "index",
            "date",
            "value",
            "anomaly",
            "magnitude",
            "normed_magnitude",
        ])
        .map_err(write_err)?;

    for report in reports {
        let a = &report.anomalies;
        for (i, value) in report.series.iter().enumerate() {
            let date = report
                .dates
                .as_ref()
                .and_then(|d| d.get(i))
                .map(|d| d.to_string())
                .unwrap_or_default();
            writer
                .write_record([
                    report.column.clone(),
                    i.to_string(),
                    date,
                    format!("{value}"),
                    a.positions.get(i).copied().unwrap_or(false).to_string(),
                    format!("{:.6}", a.values.get(i).copied().unwrap_or(0.0)),
                    format!("{:.6}", a.normed_values.get(i).copied().unwrap_or(0.0)),
                ])
                .map_err(write_err)?;
        }
    }

    writer.flush().map_err(|e| write_err(e.into()))
}

/// Write `column,index,l,s,e`, unravelled back to series order.
pub fn write_components_csv(
    path: &Path,
    components: &[(&str, &DecomposedResult)],
) -> Result<(), AppError> {
    let file = create(path, "components CSV")?;
    write_components(file, components)
}

pub fn write_components<W: Write>(
    out: W,
    components: &[(&str, &DecomposedResult)],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["column", "index", "l", "s", "e"])
        .map_err(write_err)?;

    for (name, result) in components {
        let l = unravel(&result.l);
        let s = unravel(&result.s);
        let e = unravel(&result.e);
        for (i, ((l, s), e)) in l.iter().zip(&s).zip(&e).enumerate() {
            writer
                .write_record([
                    name.to_string(),
                    i.to_string(),
                    format!("{l:.6}"),
                    format!("{s:.6}"),
                    format!("{e:.6}"),
                ])
                .map_err(write_err)?;
        }
    }

    writer.flush().map_err(|e| write_err(e.into()))
}

/// Write a generated series as `date,value`, readable by `rpca detect`.
pub fn write_sample<W: Write>(out: W, sample: &SampleSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["date", "value"]).map_err(write_err)?;
    for (date, value) in sample.dates.iter().zip(&sample.values) {
        writer
            .write_record([date.to_string(), format!("{value:.6}")])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| write_err(e.into()))
}

pub fn write_sample_csv(path: &Path, sample: &SampleSeries) -> Result<(), AppError> {
    let file = create(path, "sample CSV")?;
    write_sample(file, sample)
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write CSV: {e}"))
}
