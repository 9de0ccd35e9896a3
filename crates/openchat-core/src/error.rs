//! Error types for the Openchat core.
//!
//! Only caller mistakes are errors here: joining twice, joining from a
//! terminal state, or supplying an unusable display name. Transport and
//! protocol failures are never errors at this layer; they become state
//! transitions (see [`crate::ConnectionManager`]).

use thiserror::Error;

use crate::connection::ConnectionState;

/// Display-name and identity errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Display name is empty after trimming whitespace.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// Display name exceeds the character limit.
    #[error("display name is {len} characters, limit is {max}")]
    DisplayNameTooLong {
        /// Character count of the trimmed name.
        len: usize,
        /// Maximum allowed characters.
        max: usize,
    },

    /// A session already exists under a different display name.
    #[error("session is already assigned to {current:?}, cannot rejoin as {requested:?}")]
    DisplayNameMismatch {
        /// Name the session was created with.
        current: String,
        /// Name supplied by the rejected join.
        requested: String,
    },
}

/// Errors from [`crate::ConnectionManager`] commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Command is not valid in the current state.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the command was issued.
        state: ConnectionState,
        /// Command that was attempted.
        operation: String,
    },

    /// Session could not be created or reused.
    #[error(transparent)]
    Session(#[from] SessionError),
}
