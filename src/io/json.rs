//! Read/write detection report JSON files.
//!
//! A report file holds one `DetectionReport` per analysed column and is enough
//! to redraw the plot (`rpca plot --report`) without rerunning detection.

use std::fs::File;
use std::path::Path;

use crate::domain::DetectionReport;
use crate::error::AppError;

pub fn write_report_json(path: &Path, reports: &[DetectionReport]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, reports)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

pub fn read_report_json(path: &Path) -> Result<Vec<DetectionReport>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let reports: Vec<DetectionReport> =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    if reports.iter().any(|r| r.anomalies.len() != r.series.len()) {
        return Err(AppError::new(2, "Invalid report JSON: anomaly and series lengths differ."));
    }
    Ok(reports)
}
