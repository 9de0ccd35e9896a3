//! Fixed-interval heartbeat scheduling.
//!
//! The scheduler is a timer without a thread: the owner feeds it the current
//! time and it answers whether a ping is due. It holds at most one pending
//! deadline, so overlapping timers cannot exist.
//!
//! ```text
//! start(t0)      poll(t0+30)    poll(t0+60)          stop()
//!    │──────30s──────│──────30s──────│─────...───────────│
//!                  ping            ping               (no more)
//! ```

use std::{ops::Add, time::Duration};

/// Interval between pings while connected.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Smallest interval the scheduler accepts. Shorter values are clamped.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Heartbeat timer.
///
/// Generic over `I` so the same code runs against real and virtual clocks.
#[derive(Debug, Clone)]
pub struct HeartbeatScheduler<I> {
    /// Time between pings.
    interval: Duration,
    /// Next deadline. `None` while stopped.
    next_due: Option<I>,
}

impl<I> HeartbeatScheduler<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a stopped scheduler.
    pub fn new(interval: Duration) -> Self {
        Self { interval: interval.max(MIN_INTERVAL), next_due: None }
    }

    /// Time between pings.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the timer. The first ping is due one interval after `now`.
    ///
    /// Returns `false` (and leaves the existing deadline alone) if the timer
    /// is already running.
    pub fn start(&mut self, now: I) -> bool {
        if self.next_due.is_some() {
            return false;
        }

        self.next_due = Some(now + self.interval);
        true
    }

    /// Cancel the timer. Returns `true` if it was running.
    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Next deadline. `None` if stopped.
    pub fn next_due(&self) -> Option<I> {
        self.next_due
    }

    /// Report whether a ping is due at `now` and advance the deadline.
    ///
    /// Deadlines stay on the `start + k * interval` grid. If several intervals
    /// elapsed since the last poll, one ping is reported and the missed
    /// deadlines are skipped.
    pub fn poll(&mut self, now: I) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };

        if now < due {
            return false;
        }

        let mut next = due + self.interval;
        while next <= now {
            next = next + self.interval;
        }
        self.next_due = Some(next);
        true
    }
}
