//! Observer that records every callback.

use std::sync::{Arc, Mutex, PoisonError};

use openchat_client::Observer;
use openchat_core::{ConnectionError, ConnectionState, Message, Session};

/// Everything a [`RecordingObserver`] has seen.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    /// Every state change, in order.
    pub states: Vec<ConnectionState>,
    /// Latest full message history.
    pub messages: Vec<Message>,
    /// Number of message-history notifications.
    pub message_updates: usize,
    /// Every presence change, in order.
    pub presence: Vec<u64>,
    /// Session announced on join.
    pub session: Option<Session>,
    /// Rendered rejection errors, in order.
    pub rejections: Vec<String>,
}

/// [`Observer`] that records into shared state readable from the test.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Recorded {
        self.lock().clone()
    }

    /// Last reported state.
    pub fn state(&self) -> Option<ConnectionState> {
        self.lock().states.last().copied()
    }

    /// Latest message history.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Latest presence count.
    pub fn presence(&self) -> Option<u64> {
        self.lock().presence.last().copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Observer for RecordingObserver {
    fn on_state_change(&mut self, state: ConnectionState) {
        self.lock().states.push(state);
    }

    fn on_messages_change(&mut self, messages: &[Message]) {
        let mut recorded = self.lock();
        recorded.messages = messages.to_vec();
        recorded.message_updates += 1;
    }

    fn on_presence_change(&mut self, count: u64) {
        self.lock().presence.push(count);
    }

    fn on_session(&mut self, session: &Session) {
        self.lock().session = Some(session.clone());
    }

    fn on_command_rejected(&mut self, error: &ConnectionError) {
        self.lock().rejections.push(error.to_string());
    }
}
