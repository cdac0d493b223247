//! Numeric building blocks: period reshaping, shrinkage operators, norms,
//! least squares and descriptive statistics.

pub mod matrix;
pub mod ols;
pub mod stats;
pub mod threshold;

pub use matrix::*;
pub use ols::*;
pub use stats::*;
pub use threshold::*;
