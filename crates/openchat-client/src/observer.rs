//! Presentation-layer callbacks.

use openchat_core::{ConnectionError, ConnectionState, Message, Session};

/// Receives derived state from the runtime.
///
/// Callbacks run on the event loop, in the order the state changed. They
/// must not block.
pub trait Observer: Send {
    /// Connection state changed.
    fn on_state_change(&mut self, state: ConnectionState);

    /// Message history changed. `messages` is the full ordered history.
    fn on_messages_change(&mut self, messages: &[Message]);

    /// Relay-reported participant count changed.
    fn on_presence_change(&mut self, count: u64);

    /// A join was accepted and the session is fixed.
    fn on_session(&mut self, session: &Session) {
        let _ = session;
    }

    /// A command was rejected (for example an invalid display name).
    fn on_command_rejected(&mut self, error: &ConnectionError) {
        let _ = error;
    }
}
