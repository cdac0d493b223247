//! Formatted terminal output.
//!
//! Formatting lives here so the numeric code stays free of presentation
//! details and output changes stay local.

use crate::domain::DetectionReport;
use crate::report::RankedAnomaly;

/// Title line printed once per run.
pub fn format_banner() -> String {
    "=== rpca - Robust PCA anomaly detection ===\n".to_string()
}

/// Format the per-series summary (input, preprocessing, solver outcome).
pub fn format_run_summary(report: &DetectionReport) -> String {
    let mut out = String::new();
    let n = report.series.len();
    let freq = report.config.frequency;

    out.push_str(&format!("Series: {} | n={n}", report.column));
    if let Some(dates) = report.dates.as_ref().filter(|d| !d.is_empty()) {
        out.push_str(&format!(" | dates=[{}, {}]", dates[0], dates[dates.len() - 1]));
    }
    out.push('\n');

    out.push_str(&format!(
        "Matrix: {freq} x {} | l_penalty={:.4} | s_penalty={:.4}\n",
        n.checked_div(freq).unwrap_or(0),
        report.config.l_penalty,
        report.config.s_penalty,
    ));

    match &report.decomposition {
        Some(d) => {
            let scaling = match d.scaling {
                Some(s) => format!("mean={:.4} sd={:.4}", s.mean, s.std_dev),
                None => "off".to_string(),
            };
            out.push_str(&format!(
                "Preprocess: differenced={} | scaling: {scaling}\n",
                yes_no(d.differenced)
            ));
            if d.converged {
                out.push_str(&format!("Solver: converged after {} iterations\n", d.iterations));
            } else {
                out.push_str(&format!(
                    "Solver: NOT converged (stopped at {} iterations)\n",
                    d.iterations
                ));
            }
        }
        None => out.push_str("Solver: skipped (flat series, nothing to detect)\n"),
    }

    out.push_str(&format!(
        "Anomalies: {} of {n} points\n",
        report.anomalies.count()
    ));

    out
}

/// Format the ranked anomaly table.
pub fn format_anomaly_table(rows: &[RankedAnomaly]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No anomalies.\n");
        return out;
    }

    out.push_str(
        format!(
            "{:>6} {:<12} {:>12} {:>12} {:>10}",
            "index", "when", "value", "magnitude", "normed"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<6} {:-<12} {:-<12} {:-<12} {:-<10}\n",
        "", "", "", "", ""
    ));

    for r in rows {
        out.push_str(
            format!(
                "{:>6} {:<12} {:>12.4} {:>+12.4} {:>+10.3}",
                r.index,
                truncate(&r.label, 12),
                r.value,
                r.magnitude,
                r.normed_magnitude,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
