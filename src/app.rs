//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the log subscriber
//! - runs detection over CSV columns
//! - prints reports/plots
//! - writes optional exports

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::{Cli, Command, DetectArgs, PlotArgs, SampleArgs};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rpca` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Detect(args) if args.rpca.verbose);
    init_tracing(verbose);

    match cli.command {
        Command::Detect(args) => handle_detect(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr so stdout stays clean for reports and CSV.
///
/// `RUST_LOG` wins over the default filter.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "warn,rpca_detect=debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn handle_detect(args: DetectArgs) -> Result<(), AppError> {
    let options = args.rpca.options();
    let run = pipeline::run_detect(&args.input, &args.columns, &options)?;

    print!("{}", crate::report::format_banner());
    for series in &run.runs {
        println!();
        print!("{}", crate::report::format_run_summary(&series.report));
        println!();
        let ranked = crate::report::rank_anomalies(&series.report, args.top);
        print!("{}", crate::report::format_anomaly_table(&ranked));

        if !args.no_plot {
            println!();
            print!(
                "{}",
                crate::plot::render_ascii_plot(
                    &series.report.series,
                    &series.report.anomalies,
                    args.width,
                    args.height,
                )
            );
        }
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_anomalies_csv(path, &run.reports())?;
    }
    if let Some(path) = &args.export_components {
        crate::io::export::write_components_csv(path, &run.components())?;
    }
    if let Some(path) = &args.export_json {
        crate::io::json::write_report_json(path, &run.reports())?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let sample = crate::data::generate_series(&args.spec())?;

    let injected: Vec<String> = sample
        .injected
        .iter()
        .map(|o| format!("{}@{}({:+})", o.index, sample.dates[o.index], o.shift))
        .collect();
    let summary = format!(
        "Generated {} points; injected outliers: [{}]",
        sample.values.len(),
        injected.join(", ")
    );

    match &args.output {
        Some(path) => {
            crate::io::export::write_sample_csv(path, &sample)?;
            println!("{summary}");
            println!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::export::write_sample(&mut lock, &sample)?;
            lock.flush()
                .map_err(|e| AppError::new(2, format!("Failed to write sample CSV: {e}")))?;
            eprintln!("{summary}");
        }
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let reports = crate::io::json::read_report_json(&args.report)?;
    for report in &reports {
        println!("{}", crate::plot::render_report_plot(report, args.width, args.height));
    }
    Ok(())
}
