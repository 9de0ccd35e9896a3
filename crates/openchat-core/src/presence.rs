//! Participant count.

/// Count assumed before the relay reports anything: ourselves.
pub const SELF_PRESENCE: u64 = 1;

/// Last participant count reported by the relay.
///
/// The client never adjusts the count on its own; the relay is authoritative
/// and each report replaces the previous one outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceCounter {
    count: u64,
}

impl Default for PresenceCounter {
    fn default() -> Self {
        Self { count: SELF_PRESENCE }
    }
}

impl PresenceCounter {
    /// Counter initialized to [`SELF_PRESENCE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the count. Last write wins.
    pub fn set(&mut self, count: u64) {
        self.count = count;
    }

    /// Current count.
    pub fn get(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_self() {
        assert_eq!(PresenceCounter::new().get(), 1);
    }

    #[test]
    fn last_write_wins() {
        let mut presence = PresenceCounter::new();
        presence.set(5);
        presence.set(3);
        assert_eq!(presence.get(), 3);
    }

    #[test]
    fn zero_is_accepted() {
        let mut presence = PresenceCounter::new();
        presence.set(0);
        assert_eq!(presence.get(), 0);
    }
}
