//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - per-point and component exports, sample CSV (`export`)
//! - detection report JSON read/write (`json`)

pub mod export;
pub mod ingest;
pub mod json;

pub use export::*;
pub use ingest::*;
pub use json::*;
