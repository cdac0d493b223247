//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the resolved configuration (`RpcaConfig`) and its overrides (`RpcaOption`)
//! - decomposition outputs (`DecomposedResult`, `IterationTrace`)
//! - per-point detection outputs (`Anomalies`) and saved reports (`DetectionReport`)

pub mod types;

pub use types::*;
