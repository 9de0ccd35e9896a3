//! Error types for the client runtime.

use thiserror::Error;

/// Errors returned by [`crate::ClientHandle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The runtime has stopped and no longer accepts commands.
    #[error("client runtime has stopped")]
    Stopped,
}
