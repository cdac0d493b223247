//! Seeded noise shared by the numeric tests.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

/// `n` draws from `U[-0.5, 0.5)`.
pub fn uniform_noise(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(-0.5, 0.5);
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

/// Running sum of `steps`.
pub fn cumulative(steps: &[f64]) -> Vec<f64> {
    steps
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Uniform-step random walk starting at zero.
pub fn random_walk(seed: u64, n: usize) -> Vec<f64> {
    cumulative(&uniform_noise(seed, n))
}
