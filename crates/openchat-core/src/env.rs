//! Environment abstraction for deterministic testing.
//!
//! Decouples protocol logic from system resources (clocks, randomness). The
//! production environment reads the system clocks and OS entropy; the
//! simulation environment uses a seeded RNG and a wall clock derived from the
//! (pausable) tokio clock.

use std::{
    fmt::Debug,
    ops::{Add, Sub},
    time::Duration,
};

use chrono::{DateTime, FixedOffset};

/// Abstract environment providing time and randomness.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Monotonic instant type used for heartbeat scheduling.
    ///
    /// Production and simulation both use `tokio::time::Instant` so that
    /// paused-clock tests exercise the same scheduling code.
    type Instant: Copy
        + Ord
        + Debug
        + Send
        + Sync
        + Sub<Output = Duration>
        + Add<Duration, Output = Self::Instant>;

    /// Current monotonic time.
    ///
    /// # Invariants
    ///
    /// - Subsequent calls return values `>=` previous calls.
    fn now(&self) -> Self::Instant;

    /// Current local wall-clock time, used for display times and join
    /// timestamps. May jump; never used for scheduling.
    fn wall_clock(&self) -> DateTime<FixedOffset>;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
