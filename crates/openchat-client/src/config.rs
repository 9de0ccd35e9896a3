//! Runtime configuration.

use std::time::Duration;

use openchat_core::ConnectionConfig;

/// Public demo relay used when no other relay is configured.
pub const DEFAULT_RELAY_URL: &str = "wss://socketsbay.com/wss/v2/1/demo/";

/// How often the runtime feeds a tick into the connection manager.
///
/// Bounds heartbeat jitter: a ping goes out at most one tick after it is due.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Time allowed for the relay connection to open before falling back.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Relay endpoint.
    pub relay_url: String,
    /// Connection state machine configuration.
    pub connection: ConnectionConfig,
    /// Tick period of the event loop.
    pub tick_interval: Duration,
    /// Timeout for opening the relay connection.
    pub connect_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            connection: ConnectionConfig::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use openchat_core::{DEFAULT_HEARTBEAT_INTERVAL, Locale};

    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();

        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(config.connection.heartbeat_interval, DEFAULT_HEARTBEAT_INTERVAL);
        assert_eq!(config.connection.locale, Locale::English);
        assert!(config.tick_interval < config.connection.heartbeat_interval);
    }
}
