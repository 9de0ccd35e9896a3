//! Commands from the presentation layer.

use tokio::sync::mpsc;

use crate::error::ClientError;

/// User intent delivered to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect under this display name.
    JoinAs(String),
    /// Send this text as a chat message.
    SendText(String),
    /// Leave the relay.
    Leave,
}

/// Cloneable sender of [`Command`]s to a running [`crate::Runtime`].
///
/// Dropping every handle ends the event loop, which then leaves the relay
/// before returning.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ClientHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Connect under `display_name`.
    pub fn join_as(&self, display_name: impl Into<String>) -> Result<(), ClientError> {
        self.send(Command::JoinAs(display_name.into()))
    }

    /// Send `text` as a chat message.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.send(Command::SendText(text.into()))
    }

    /// Leave the relay.
    pub fn leave(&self) -> Result<(), ClientError> {
        self.send(Command::Leave)
    }

    /// Deliver a raw command.
    pub fn send(&self, command: Command) -> Result<(), ClientError> {
        self.tx.send(command).map_err(|_| ClientError::Stopped)
    }

    /// Whether the runtime has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_arrive_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ClientHandle::new(tx);

        handle.join_as("alice").unwrap();
        handle.send_text("hi").unwrap();
        handle.leave().unwrap();

        assert_eq!(rx.try_recv().unwrap(), Command::JoinAs("alice".into()));
        assert_eq!(rx.try_recv().unwrap(), Command::SendText("hi".into()));
        assert_eq!(rx.try_recv().unwrap(), Command::Leave);
    }

    #[test]
    fn stopped_runtime_rejects_commands() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ClientHandle::new(tx);
        drop(rx);

        assert!(handle.is_closed());
        assert_eq!(handle.send_text("hi"), Err(ClientError::Stopped));
    }
}
