//! Tagged relay frames.
//!
//! The relay forwards every frame it receives to every connected participant,
//! so a client sees its own outbound frame types from others as well. The
//! decoder therefore recognizes all five shapes in both directions and leaves
//! direction policy to the caller.

use serde::{Deserialize, Serialize};

use crate::{
    Message,
    errors::{ProtocolError, Result},
};

/// One frame on the relay connection.
///
/// # Invariants
///
/// - Tag Uniqueness: each variant maps to exactly one `type` string, returned
///   by [`Frame::frame_type`].
/// - Forward Compatibility: an object with an unrecognized `type` decodes to
///   [`Frame::Unknown`] instead of failing, so newer peers never break older
///   clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Frame {
    /// Participant arrival.
    Join {
        /// Sender's participant id.
        #[serde(rename = "participantId")]
        participant_id: String,
        /// Sender's display name.
        #[serde(rename = "displayName")]
        display_name: String,
        /// Unix time of the join in milliseconds.
        timestamp: i64,
    },

    /// Participant departure.
    Leave {
        /// Sender's participant id.
        #[serde(rename = "participantId")]
        participant_id: String,
    },

    /// Chat message broadcast.
    Message {
        /// The message literal.
        data: Message,
    },

    /// Liveness heartbeat.
    Ping {
        /// Sender's participant id.
        #[serde(rename = "participantId")]
        participant_id: String,
    },

    /// Authoritative presence count from the relay.
    UserCount {
        /// Number of connected participants.
        count: u64,
    },

    /// Frame with a `type` this client does not understand.
    #[serde(other)]
    Unknown,
}

impl Frame {
    /// Wire `type` tag of this frame.
    pub fn frame_type(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Message { .. } => "message",
            Self::Ping { .. } => "ping",
            Self::UserCount { .. } => "userCount",
            Self::Unknown => "unknown",
        }
    }

    /// Encode to the JSON text sent on the wire.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Encode` if `self` is [`Frame::Unknown`], which has no
    ///   wire representation of its own.
    pub fn encode(&self) -> Result<String> {
        if matches!(self, Self::Unknown) {
            return Err(ProtocolError::Encode("unknown frames cannot be sent".to_string()));
        }

        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode one frame from JSON text.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Malformed` if `text` is not valid JSON
    /// - `ProtocolError::InvalidFrame` if the JSON is not an object with a
    ///   string `type`, or a recognized `type` carries ill-typed or missing
    ///   fields (e.g. `message` without `data`, negative `count`)
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ProtocolError::from_decode(&e))
    }
}
