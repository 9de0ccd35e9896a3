//! Openchat client runtime
//!
//! Async orchestration around the sans-IO [`openchat_core::ConnectionManager`].
//! The [`Runtime`] owns the connection manager and a [`Driver`], runs a single
//! event loop over user commands, inbound frames and timer ticks, and reports
//! derived state to an [`Observer`].
//!
//! The presentation layer talks to a running loop through a [`ClientHandle`]:
//!
//! ```text
//! ClientHandle ──Command──> Runtime ──Frame──> Driver ──> relay
//!                              │  <──TransportEvent──┘
//!                              └──> Observer (state, messages, presence)
//! ```
//!
//! # Features
//!
//! - `transport`: WebSocket [`transport::WebSocketDriver`] for real relays.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod command;
pub mod config;
mod driver;
pub mod error;
mod observer;
mod runtime;
mod system_env;
#[cfg(feature = "transport")]
pub mod transport;

pub use command::{ClientHandle, Command};
pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_RELAY_URL, DEFAULT_TICK_INTERVAL, RuntimeConfig};
pub use driver::{Driver, TransportEvent};
pub use error::ClientError;
pub use observer::Observer;
pub use runtime::Runtime;
pub use system_env::SystemEnv;
