//! Unit-root testing used to decide whether a series needs differencing.

pub mod adf;

pub use adf::*;
