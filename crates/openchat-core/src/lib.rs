//! Openchat core
//!
//! Sans-IO state machines for a relay chat client. Nothing in this crate
//! performs I/O or reads a clock on its own: time and randomness come from an
//! [`Environment`], inbound occurrences arrive as [`ConnectionEvent`]s, and
//! every operation returns [`ConnectionAction`]s for a runtime to execute.
//!
//! # Components
//!
//! - [`MessageStore`]: ordered, deduplicated message history
//! - [`PresenceCounter`]: last relay-reported participant count
//! - [`HeartbeatScheduler`]: fixed-interval liveness pings while connected
//! - [`Session`]: participant id and display name
//! - [`ConnectionManager`]: connection lifecycle driving all of the above
//! - [`Locale`]: system notice strings

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;
pub mod heartbeat;
pub mod notice;
pub mod presence;
pub mod session;
pub mod store;

pub use connection::{
    ConnectionAction, ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionState,
};
pub use env::Environment;
pub use error::{ConnectionError, SessionError};
pub use heartbeat::{DEFAULT_HEARTBEAT_INTERVAL, HeartbeatScheduler};
pub use notice::Locale;
pub use openchat_proto::{Frame, Message, MessageId};
pub use presence::PresenceCounter;
pub use session::{MAX_DISPLAY_NAME_CHARS, Session};
pub use store::MessageStore;
