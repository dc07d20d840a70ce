// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backoff computation for the retry loop.
//!
//! The wait before retry `n` (1-based) is
//! `base * 2^(n-1) + uniform(0..=jitter)`. The RNG is supplied by the
//! caller so the client can own a seedable generator instance instead of
//! reaching for a process-global one.

use std::time::Duration;

use rand::Rng;
use rand::RngExt;

/// Exponential backoff with a uniformly distributed jitter bound.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    base: Duration,
    jitter: Duration,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Calculate the delay before the given retry.
    ///
    /// # Arguments
    /// * `attempt` - 1-based count of retries already performed; the first
    ///   retry uses exponent 0.
    pub fn delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let base_ms = self.base.as_millis() as f64 * 2f64.powi(exponent as i32);

        let jitter_bound = self.jitter.as_millis() as u64;
        let jitter_ms = if jitter_bound > 0 {
            rng.random_range(0..=jitter_bound)
        } else {
            0
        };

        Duration::from_millis(base_ms as u64 + jitter_ms)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), Duration::from_millis(100))
    }
}
