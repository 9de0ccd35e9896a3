//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Input is not syntactically valid JSON.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Input is JSON but does not match any recognized frame shape.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Frame could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Classify a `serde_json` decode error.
    pub(crate) fn from_decode(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Data => Self::InvalidFrame(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => Self::Malformed(err.to_string()),
        }
    }
}
