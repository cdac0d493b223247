//! Robust PCA anomaly detection.
//!
//! Pipeline (leaves first):
//!
//! 1. `preprocess`: optional first differencing, driven by the ADF test
//! 2. `math::reshape`: fold the series into a period matrix
//! 3. `normalize`: optional z-scoring
//! 4. `engine`: Stable Principal Component Pursuit fixed-point iteration
//! 5. `extract`: unravel the sparse component into per-point anomalies
//!
//! `detect` wires the steps together behind the public entry points.

pub mod detect;
pub mod engine;
pub mod extract;
pub mod normalize;
pub mod preprocess;

pub use detect::*;
pub use engine::*;
pub use extract::*;
pub use normalize::*;
pub use preprocess::*;
