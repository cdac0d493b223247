//! Synthetic series for demos and tests.

pub mod sample;

#[cfg(test)]
pub(crate) mod fixtures;

pub use sample::*;
