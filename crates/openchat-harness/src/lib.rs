//! Deterministic simulation harness for the Openchat client.
//!
//! In-memory implementations of the [`openchat_core::Environment`] and
//! [`openchat_client::Driver`] traits. Tests run the production
//! [`openchat_client::Runtime`] against them under tokio's paused clock, so
//! heartbeat cadence and teardown ordering are reproducible to the tick.
//!
//! - [`SimEnv`]: seeded RNG and a wall clock that follows the tokio clock
//! - [`SimDriver`]: scripted transport with a [`SimDriverHandle`] for
//!   injecting frames and failures
//! - [`SimRelay`]: in-process broadcast relay connecting several drivers
//! - [`RecordingObserver`]: records every observer callback

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod observer;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_relay;

pub use observer::{Recorded, RecordingObserver};
pub use sim_driver::{SimDriver, SimDriverError, SimDriverHandle};
pub use sim_env::SimEnv;
pub use sim_relay::SimRelay;
