//! Openchat wire protocol
//!
//! JSON frames exchanged with the shared relay. Every frame is a single JSON
//! object tagged with a `type` field:
//!
//! | Frame type  | Direction | Fields                                  |
//! |-------------|-----------|-----------------------------------------|
//! | `join`      | out       | `participantId, displayName, timestamp` |
//! | `leave`     | out       | `participantId`                         |
//! | `message`   | both      | `data: Message`                         |
//! | `ping`      | out       | `participantId`                         |
//! | `userCount` | in        | `count`                                 |
//!
//! The relay is public and unauthenticated, so decoding is lenient where other
//! clients are known to differ (numeric message ids, missing optional fields)
//! and strict everywhere else. A frame that fails to decode is reported as a
//! [`ProtocolError`]; callers decide whether that is fatal (it never is for
//! the chat client).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;
mod message;

pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use message::{Message, MessageId};
