//! Reporting utilities: anomaly rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::DetectionReport;

/// One flagged point, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAnomaly {
    pub index: usize,
    /// Date when the input had one, else the index.
    pub label: String,
    pub value: f64,
    pub magnitude: f64,
    pub normed_magnitude: f64,
}

/// Flagged points ordered by normalized magnitude, strongest first.
///
/// Ties keep time order.
pub fn rank_anomalies(report: &DetectionReport, top_n: usize) -> Vec<RankedAnomaly> {
    let a = &report.anomalies;
    let mut ranked: Vec<RankedAnomaly> = a
        .indices()
        .into_iter()
        .map(|index| RankedAnomaly {
            index,
            label: report.label(index),
            value: report.series.get(index).copied().unwrap_or(f64::NAN),
            magnitude: a.values[index],
            normed_magnitude: a.normed_values[index],
        })
        .collect();

    ranked.sort_by(|x, y| {
        y.normed_magnitude
            .abs()
            .total_cmp(&x.normed_magnitude.abs())
            .then(x.index.cmp(&y.index))
    });
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::{Anomalies, DecompositionSummary, DetectionReport, RpcaConfig, Scaling};
    use chrono::NaiveDate;

    /// Six points, two of them flagged.
    pub fn report() -> DetectionReport {
        let mut anomalies = Anomalies::none(6);
        for (i, v, n) in [(1, 4.0, 2.0), (4, -9.0, -4.5)] {
            anomalies.positions[i] = true;
            anomalies.values[i] = v;
            anomalies.normed_values[i] = n;
        }
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DetectionReport {
            tool: "rpca".to_string(),
            column: "visits".to_string(),
            config: RpcaConfig {
                frequency: 3,
                s_penalty: 0.5,
                ..RpcaConfig::default()
            },
            decomposition: Some(DecompositionSummary {
                converged: true,
                iterations: 17,
                differenced: false,
                scaling: Some(Scaling {
                    mean: 10.0,
                    std_dev: 2.0,
                }),
            }),
            dates: Some((0..6).map(|i| start + chrono::Duration::days(i)).collect()),
            series: vec![10.0, 14.0, 11.0, 10.0, 1.0, 11.0],
            anomalies,
        }
    }
}
