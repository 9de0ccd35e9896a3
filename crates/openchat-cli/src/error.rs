//! CLI error types.

use openchat_client::ClientError;
use openchat_core::SessionError;
use thiserror::Error;

/// Errors that end the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    /// Terminal I/O failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Display name supplied on the command line was rejected.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The client runtime stopped unexpectedly.
    #[error(transparent)]
    Client(#[from] ClientError),
}
