//! Command-line arguments.

use std::time::Duration;

use clap::Parser;
use openchat_client::{DEFAULT_RELAY_URL, RuntimeConfig};
use openchat_core::{ConnectionConfig, Locale};

/// Openchat terminal client
#[derive(Parser, Debug)]
#[command(name = "openchat")]
#[command(about = "Chat through a shared WebSocket relay")]
#[command(version)]
pub struct Args {
    /// Relay WebSocket URL
    #[arg(long, default_value = DEFAULT_RELAY_URL)]
    pub relay: String,

    /// Display name (prompted for if omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Language of system notices (en, ja)
    #[arg(long, default_value = "en")]
    pub locale: Locale,

    /// Seconds between heartbeat pings
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub heartbeat_secs: u64,

    /// Log filter, used when the environment does not set one
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Runtime configuration described by these arguments.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            relay_url: self.relay.clone(),
            connection: ConnectionConfig {
                heartbeat_interval: Duration::from_secs(self.heartbeat_secs),
                locale: self.locale,
            },
            ..RuntimeConfig::default()
        }
    }
}
