//! Ordered, deduplicated message history.
//!
//! The store is the single source of truth for what is rendered. Local sends
//! and inbound relay messages are appended in the order the event loop issues
//! them; an id that has been seen before is silently absorbed. The relay echoes
//! our own messages back to us, so duplicates are routine, not exceptional.
//!
//! # Invariants
//!
//! - Insertion Order: for all `i < j`, `all()[i]` was appended no later than
//!   `all()[j]`.
//! - Uniqueness: no two entries share an id.
//! - Immutability: existing entries are never modified, removed or reordered.

use std::collections::HashSet;

use openchat_proto::{Message, MessageId};

/// Append-only message history with an identity index.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    /// Messages in insertion order.
    messages: Vec<Message>,
    /// Ids of every stored message, for O(1) duplicate checks.
    seen: HashSet<MessageId>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` unless its id is already present.
    ///
    /// Returns `true` if the message was appended, `false` if it was absorbed
    /// as a duplicate.
    pub fn append(&mut self, message: Message) -> bool {
        if !self.seen.insert(message.id.clone()) {
            return false;
        }

        self.messages.push(message);
        debug_assert_eq!(self.messages.len(), self.seen.len());
        true
    }

    /// Full ordered history.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate the history in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Check whether a message with `id` has been stored.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
