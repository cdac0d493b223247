//! CSV ingest of one or more time series.
//!
//! The expected shape is a header row followed by one row per observation:
//!
//! ```text
//! date,visits,signups
//! 2024-01-01,120.5,14
//! 2024-01-02,118.0,11
//! ```
//!
//! - the `date` (or `timestamp`) column is optional; every other column is a series
//! - `--column` restricts ingest to the named columns
//! - a bad cell fails the whole file: skipping a row would shift every later
//!   point into the wrong period

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::AppError;

const DATE_COLUMNS: [&str; 2] = ["date", "timestamp"];

/// One named series, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct IngestedSeries {
    /// Present when the file has a date column.
    pub dates: Option<Vec<NaiveDate>>,
    pub columns: Vec<SeriesColumn>,
    pub rows_read: usize,
}

impl IngestedSeries {
    pub fn len(&self) -> usize {
        self.rows_read
    }

    pub fn is_empty(&self) -> bool {
        self.rows_read == 0
    }
}

/// Load series from a CSV file.
pub fn load_series_csv(path: &Path, columns: &[String]) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_series(file, columns)
}

/// Parse series from any CSV reader; `columns` empty means all value columns.
pub fn read_series<R: Read>(input: R, columns: &[String]) -> Result<IngestedSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let date_idx = DATE_COLUMNS.iter().find_map(|name| header_map.get(*name).copied());
    let selected = select_columns(&headers, &header_map, date_idx, columns)?;

    let mut dates = date_idx.map(|_| Vec::new());
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); selected.len()];
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; CSV lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
        rows_read += 1;

        if let (Some(col), Some(dates)) = (date_idx, dates.as_mut()) {
            let raw = get_cell(&record, col, &headers, line)?;
            dates.push(parse_date(raw).map_err(|e| AppError::new(2, format!("Line {line}: {e}")))?);
        }

        for (slot, &(col, _)) in values.iter_mut().zip(&selected) {
            let raw = get_cell(&record, col, &headers, line)?;
            let value = parse_value(raw).ok_or_else(|| {
                AppError::new(
                    2,
                    format!(
                        "Line {line}: invalid value '{raw}' in column `{}`.",
                        header_name(&headers, col)
                    ),
                )
            })?;
            slot.push(value);
        }
    }

    if rows_read == 0 {
        return Err(AppError::new(3, "CSV contains no data rows."));
    }

    let columns = selected
        .into_iter()
        .zip(values)
        .map(|((_, name), values)| SeriesColumn { name, values })
        .collect();

    Ok(IngestedSeries {
        dates,
        columns,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn header_name(headers: &StringRecord, idx: usize) -> String {
    headers
        .get(idx)
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .unwrap_or_else(|| format!("#{idx}"))
}

/// Resolve requested names to `(index, display name)` pairs.
fn select_columns(
    headers: &StringRecord,
    header_map: &HashMap<String, usize>,
    date_idx: Option<usize>,
    requested: &[String],
) -> Result<Vec<(usize, String)>, AppError> {
    if requested.is_empty() {
        let all: Vec<(usize, String)> = (0..headers.len())
            .filter(|idx| Some(*idx) != date_idx)
            .map(|idx| (idx, header_name(headers, idx)))
            .collect();
        if all.is_empty() {
            return Err(AppError::new(2, "CSV has no value columns."));
        }
        return Ok(all);
    }

    requested
        .iter()
        .map(|name| {
            let key = normalize_header_name(name);
            match header_map.get(&key) {
                Some(&idx) if Some(idx) != date_idx => Ok((idx, header_name(headers, idx))),
                Some(_) => Err(AppError::new(
                    2,
                    format!("Column `{name}` is the date column, not a series."),
                )),
                None => Err(AppError::new(2, format!("Missing requested column: `{name}`"))),
            }
        })
        .collect()
}

fn get_cell<'a>(
    record: &'a StringRecord,
    idx: usize,
    headers: &StringRecord,
    line: usize,
) -> Result<&'a str, AppError> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Line {line}: missing value in column `{}`.", header_name(headers, idx)),
            )
        })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Timestamps keep only their date part.
    let day = s.split(['T', ' ']).next().unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

fn parse_value(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
