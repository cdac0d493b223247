//! Map the sparse component back onto the series timeline.

use crate::domain::{Anomalies, DecomposedResult};
use crate::math::unravel;

/// Unravel `S` (and its normalized form) into per-point anomalies.
///
/// A point is anomalous iff its sparse entry is non-zero.
pub fn extract_anomalies(decomposed: &DecomposedResult) -> Anomalies {
    let values = unravel(&decomposed.s);
    let normed_values = unravel(&decomposed.s_normed);
    let positions = values.iter().map(|&v| v != 0.0).collect();
    Anomalies {
        positions,
        values,
        normed_values,
    }
}
