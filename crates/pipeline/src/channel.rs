//! Additive white Gaussian noise channel
//!
//! The channel perturbs each sample with an independent draw from a fixed
//! normal distribution. Mean and standard deviation are supplied at
//! construction and never change; the channel owns its generator, so a
//! seeded channel replays the same noise realization on every run.

use crate::{PipelineError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use tracing::debug;

/// Noisy channel adding Normal(mean, sigma) to every sample.
#[derive(Debug)]
pub struct AwgnChannel {
    mean: f64,
    sigma: f64,
    noise: Option<Normal<f64>>,
    rng: StdRng,
}

impl AwgnChannel {
    /// Create a channel seeded from system entropy.
    pub fn new(mean: f64, sigma: f64) -> Result<Self> {
        Self::build(mean, sigma, StdRng::from_entropy())
    }

    /// Create a channel with a fixed seed; the noise realization is then
    /// reproducible run to run.
    pub fn with_seed(mean: f64, sigma: f64, seed: u64) -> Result<Self> {
        Self::build(mean, sigma, StdRng::seed_from_u64(seed))
    }

    fn build(mean: f64, sigma: f64, rng: StdRng) -> Result<Self> {
        if sigma < 0.0 || !sigma.is_finite() || !mean.is_finite() {
            return Err(PipelineError::InvalidNoiseLevel { sigma });
        }
        // A silent channel skips the distribution entirely so that the
        // noiseless path is bit-exact, not merely within rounding error.
        let noise = if sigma == 0.0 && mean == 0.0 {
            None
        } else {
            Some(
                Normal::new(mean, sigma)
                    .map_err(|_| PipelineError::InvalidNoiseLevel { sigma })?,
            )
        };
        Ok(Self {
            mean,
            sigma,
            noise,
            rng,
        })
    }

    /// Mean of the noise distribution.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation of the noise distribution.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Pass a signal through the channel, perturbing every sample.
    pub fn transmit(&mut self, signal: &[f64]) -> Vec<f64> {
        let Some(noise) = self.noise else {
            return signal.to_vec();
        };
        debug!(
            samples = signal.len(),
            sigma = self.sigma,
            "channel noise applied"
        );
        signal
            .iter()
            .map(|&sample| sample + self.rng.sample(noise))
            .collect()
    }
}
