//! Terminal client for an Openchat relay
//!
//! A thin shell over [`openchat_client::Runtime`]: stdin lines become
//! commands through [`forward`], and a [`LineRenderer`] prints the
//! synchronized state to stdout.
//! Logs go to stderr so they never interleave with the chat view.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod args;
pub mod error;
pub mod input;
pub mod render;

pub use args::Args;
pub use error::CliError;
pub use input::{Input, forward, shutdown};
pub use render::LineRenderer;
