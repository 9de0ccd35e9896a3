//! Production Environment implementation using system time and RNG.
//!
//! # Capabilities
//!
//! - Monotonic time from `tokio::time::Instant`, so the heartbeat follows the
//!   tokio clock in both production and paused-clock tests
//! - Local wall-clock time from `chrono::Local`
//! - OS randomness (getrandom) for participant and message ids

use chrono::{DateTime, FixedOffset, Local};
use openchat_core::Environment;

/// Production environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn wall_clock(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("invariant: OS RNG is available");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_differ() {
        let env = SystemEnv::new();

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env.random_bytes(&mut a);
        env.random_bytes(&mut b);

        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn now_follows_tokio_clock() {
        let env = SystemEnv::new();

        let t0 = env.now();
        tokio::time::advance(std::time::Duration::from_secs(30)).await;

        assert_eq!(env.now() - t0, std::time::Duration::from_secs(30));
    }
}
