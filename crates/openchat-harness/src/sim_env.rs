//! Simulation environment.
//!
//! Time comes from the tokio clock, so a test that starts paused controls
//! both the heartbeat and the displayed message times. Randomness comes from
//! a seeded `ChaCha8` RNG, so participant and message ids repeat across runs.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use openchat_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall-clock time at simulation start: 2024-06-01 09:00:00 UTC.
const DEFAULT_WALL_START_SECS: i64 = 1_717_232_400;

/// Deterministic environment for tests.
#[derive(Debug, Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha8Rng>>,
    start: tokio::time::Instant,
    wall_start: DateTime<FixedOffset>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl SimEnv {
    /// Environment seeded with 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with a specific RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let wall_start = DateTime::<Utc>::UNIX_EPOCH.fixed_offset() + TimeDelta::seconds(DEFAULT_WALL_START_SECS);

        Self {
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            start: tokio::time::Instant::now(),
            wall_start,
        }
    }

    /// Replace the wall-clock time at simulation start.
    #[must_use]
    pub fn with_wall_clock(mut self, wall_start: DateTime<FixedOffset>) -> Self {
        self.wall_start = wall_start;
        self
    }
}

impl Environment for SimEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn wall_clock(&self) -> DateTime<FixedOffset> {
        let elapsed = tokio::time::Instant::now() - self.start;
        self.wall_start + TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::zero())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        let a = SimEnv::with_seed(7);
        let b = SimEnv::with_seed(7);

        assert_eq!(a.random_u64(), b.random_u64());
        assert_ne!(a.random_u64(), SimEnv::with_seed(8).random_u64());
    }

    #[test]
    fn clones_share_rng() {
        let a = SimEnv::with_seed(7);
        let b = a.clone();

        assert_ne!(a.random_u64(), b.random_u64());
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_follows_paused_time() {
        let env = SimEnv::new();
        assert_eq!(env.wall_clock().format("%H:%M").to_string(), "09:00");

        tokio::time::advance(Duration::from_secs(125)).await;
        assert_eq!(env.wall_clock().format("%H:%M:%S").to_string(), "09:02:05");
    }
}
