//! `rpca-detect` library crate.
//!
//! The binary (`rpca`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the detector can be embedded directly (`rpca::find_anomalies`)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod rpca;
pub mod stationarity;
