//! Relay connection state machine.
//!
//! Owns the connection lifecycle, the message history, the presence count and
//! the heartbeat. Uses the action pattern: every method takes its inputs
//! (including the current time) as parameters and returns actions for the
//! runtime to execute, so the machine itself performs no I/O.
//!
//! # State Machine
//!
//! ```text
//!                 connect()              Opened
//! ┌──────────────┐────────>┌────────────┐──────>┌───────────┐
//! │ Disconnected │         │ Connecting │       │ Connected │
//! └──────────────┘<────────└────────────┘       └───────────┘
//!    ↑    ↑     disconnect()     │ OpenFailed     │      │
//!    │    │                      ↓                │      │ disconnect()
//!    │    │              ┌───────────────┐        │      ↓
//!    │    │              │ LocalFallback │        │  ┌─────────┐
//!    │    │              └───────────────┘        │  │ Closing │
//!    │    └─────── TransportClosed/Error ─────────┘  └─────────┘
//!    └──────────────────── Closed ─────────────────────────┘
//! ```
//!
//! `LocalFallback` is terminal: messages are still recorded locally but no
//! relay is ever retried. From `Disconnected` a new `connect` with the same
//! display name reconnects under the same participant id; nothing reconnects
//! automatically.

use std::{fmt, time::Duration};

use openchat_proto::{Frame, Message, MessageId};
use tracing::{debug, info, warn};

use crate::{
    env::Environment,
    error::{ConnectionError, SessionError},
    heartbeat::{DEFAULT_HEARTBEAT_INTERVAL, HeartbeatScheduler},
    notice::Locale,
    presence::PresenceCounter,
    session::Session,
    store::MessageStore,
};

/// Display format of [`Message::sent_at`].
const DISPLAY_TIME_FORMAT: &str = "%H:%M";

/// Connection state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No connection, none in progress.
    Disconnected,
    /// Transport open requested, not yet confirmed.
    Connecting,
    /// Transport open and join sent.
    Connected,
    /// Relay unreachable; messages stay on this device.
    LocalFallback,
    /// Leave sent, waiting for the transport to close.
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::LocalFallback => "local",
            Self::Closing => "closing",
        };
        f.write_str(s)
    }
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Time between pings while connected.
    pub heartbeat_interval: Duration,
    /// Language of system notices.
    pub locale: Locale,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL, locale: Locale::default() }
    }
}

/// Actions returned by the connection state machine.
///
/// The runtime executes these in order:
/// - `Open`: open the transport, then report `Opened` or `OpenFailed`
/// - `Send`: encode and transmit the frame
/// - `Close`: close the transport, then report `Closed`
/// - `StateChanged`, `MessagesChanged`, `PresenceChanged`: notify observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open the relay transport.
    Open,
    /// Send this frame to the relay.
    Send(Frame),
    /// Close the relay transport.
    Close,
    /// Connection state changed to this value.
    StateChanged(ConnectionState),
    /// Message history grew.
    MessagesChanged,
    /// Presence count changed to this value.
    PresenceChanged(u64),
}

/// Events the runtime feeds into the state machine.
///
/// Generic over `I` (Instant type) so production and simulation clocks drive
/// the same code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent<I> {
    /// Transport opened after an `Open` action.
    Opened {
        /// Current time from the environment.
        now: I,
    },
    /// Transport could not be opened.
    OpenFailed {
        /// Human-readable failure reason.
        reason: String,
    },
    /// Text frame received from the relay.
    FrameReceived(String),
    /// Transport closed without a `Close` action.
    TransportClosed,
    /// Transport failed (read or write error).
    TransportError {
        /// Human-readable failure reason.
        reason: String,
    },
    /// Transport finished closing after a `Close` action.
    Closed,
    /// Time tick for heartbeat processing.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Connection state machine.
///
/// Single owner of the session, the message history, the presence count and
/// the heartbeat timer. The presentation layer reads derived state and issues
/// commands through the runtime; it never mutates these directly.
pub struct ConnectionManager<E: Environment> {
    /// Clocks and randomness.
    env: E,
    /// Configuration.
    config: ConnectionConfig,
    /// Current state.
    state: ConnectionState,
    /// Participant id, generated once per instance.
    participant_id: String,
    /// Identity fixed by the first successful `connect`.
    session: Option<Session>,
    /// Message history.
    store: MessageStore,
    /// Relay-reported participant count.
    presence: PresenceCounter,
    /// Ping timer, running only while connected.
    heartbeat: HeartbeatScheduler<E::Instant>,
}

impl<E: Environment> ConnectionManager<E> {
    /// Create a disconnected manager with a freshly generated participant id.
    pub fn new(env: E, config: ConnectionConfig) -> Self {
        let participant_id = Session::generate_participant_id(&env);
        let heartbeat = HeartbeatScheduler::new(config.heartbeat_interval);

        Self {
            env,
            config,
            state: ConnectionState::Disconnected,
            participant_id,
            session: None,
            store: MessageStore::new(),
            presence: PresenceCounter::new(),
            heartbeat,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Full message history in insertion order.
    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    /// Message store.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Last relay-reported participant count.
    pub fn presence(&self) -> u64 {
        self.presence.get()
    }

    /// Session, once a display name has been accepted.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Participant id used in every outbound frame.
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Whether the heartbeat timer is running.
    pub fn heartbeat_running(&self) -> bool {
        self.heartbeat.is_running()
    }

    /// Next heartbeat deadline. `None` while the timer is stopped.
    pub fn next_heartbeat(&self) -> Option<E::Instant> {
        self.heartbeat.next_due()
    }

    /// Language of system notices.
    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    /// Begin connecting as `display_name`.
    ///
    /// The first call fixes the session. Later calls (explicit reconnects
    /// after the transport dropped) must use the same display name.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` if not `Disconnected`
    /// - `ConnectionError::Session` if the name is invalid or differs from
    ///   the existing session's name
    pub fn connect(&mut self, display_name: &str) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != ConnectionState::Disconnected {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "connect".to_string(),
            });
        }

        match &self.session {
            Some(session) => {
                let requested = Session::validate_display_name(display_name)?;
                if requested != session.display_name() {
                    return Err(SessionError::DisplayNameMismatch {
                        current: session.display_name().to_string(),
                        requested: requested.to_string(),
                    }
                    .into());
                }
            },
            None => {
                self.session = Some(Session::new(self.participant_id.clone(), display_name)?);
            },
        }

        info!(participant_id = %self.participant_id, "connecting to relay");

        let mut actions = Vec::new();
        actions.extend(self.transition(ConnectionState::Connecting));
        actions.push(ConnectionAction::Open);
        Ok(actions)
    }

    /// Process a transport or timer event.
    ///
    /// Events that do not apply to the current state are ignored.
    pub fn handle(&mut self, event: ConnectionEvent<E::Instant>) -> Vec<ConnectionAction> {
        match event {
            ConnectionEvent::Opened { now } => self.handle_opened(now),
            ConnectionEvent::OpenFailed { reason } => self.handle_open_failed(&reason),
            ConnectionEvent::FrameReceived(text) => self.receive(&text),
            ConnectionEvent::TransportClosed => self.handle_transport_lost("closed by relay"),
            ConnectionEvent::TransportError { reason } => self.handle_transport_lost(&reason),
            ConnectionEvent::Closed => self.handle_closed(),
            ConnectionEvent::Tick { now } => self.handle_tick(now),
        }
    }

    /// Apply one inbound text frame.
    ///
    /// Frames that fail to decode are logged and dropped. `message` frames are
    /// inserted with dedup, `userCount` overwrites presence, and everything
    /// else is ignored.
    pub fn receive(&mut self, text: &str) -> Vec<ConnectionAction> {
        let frame = match Frame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, len = text.len(), "dropping inbound frame");
                return Vec::new();
            },
        };

        match frame {
            Frame::Message { data } => {
                let id = data.id.clone();
                if self.store.append(data) {
                    vec![ConnectionAction::MessagesChanged]
                } else {
                    debug!(id = %id, "absorbed duplicate message");
                    Vec::new()
                }
            },
            Frame::UserCount { count } => {
                if self.presence.get() == count {
                    return Vec::new();
                }
                self.presence.set(count);
                vec![ConnectionAction::PresenceChanged(count)]
            },
            other @ (Frame::Join { .. } | Frame::Leave { .. } | Frame::Ping { .. } | Frame::Unknown) => {
                debug!(frame_type = other.frame_type(), "ignoring frame");
                Vec::new()
            },
        }
    }

    /// Record `message` locally and transmit it if connected.
    ///
    /// A message whose id is already stored is a no-op. Nothing is queued
    /// for later delivery.
    pub fn send(&mut self, message: Message) -> Vec<ConnectionAction> {
        if !self.store.append(message.clone()) {
            debug!(id = %message.id, "message already recorded");
            return Vec::new();
        }

        let mut actions = vec![ConnectionAction::MessagesChanged];
        if self.state == ConnectionState::Connected {
            actions.push(ConnectionAction::Send(Frame::Message { data: message }));
        }
        actions
    }

    /// Author a message from the session's display name and send it.
    ///
    /// Text that is blank after trimming is ignored, as is any text sent
    /// before a session exists.
    pub fn send_text(&mut self, text: &str) -> Vec<ConnectionAction> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let Some(author) = self.session.as_ref().map(|s| s.display_name().to_string()) else {
            debug!("ignoring text sent before join");
            return Vec::new();
        };

        let message = Message::user(self.next_message_id(), author, text, self.display_time());
        self.send(message)
    }

    /// Leave the relay.
    ///
    /// When connected this records and broadcasts a "left" notice, sends
    /// `leave`, moves to `Closing` and closes the transport, in that order.
    /// A pending open is abandoned. In every other state nothing is sent.
    pub fn disconnect(&mut self) -> Vec<ConnectionAction> {
        match self.state {
            ConnectionState::Connected => {
                let name = self.session.as_ref().map(|s| s.display_name().to_string()).unwrap_or_default();
                let notice = self.system_notice(self.config.locale.left(&name));

                let mut actions = Vec::new();
                if self.store.append(notice.clone()) {
                    actions.push(ConnectionAction::MessagesChanged);
                }
                actions.push(ConnectionAction::Send(Frame::Message { data: notice }));
                actions.push(ConnectionAction::Send(Frame::Leave {
                    participant_id: self.participant_id.clone(),
                }));
                actions.extend(self.transition(ConnectionState::Closing));
                actions.push(ConnectionAction::Close);

                info!(participant_id = %self.participant_id, "leaving relay");
                actions
            },
            ConnectionState::Connecting => {
                let mut actions = Vec::new();
                actions.extend(self.transition(ConnectionState::Disconnected));
                actions.push(ConnectionAction::Close);
                actions
            },
            ConnectionState::Disconnected | ConnectionState::LocalFallback | ConnectionState::Closing => {
                Vec::new()
            },
        }
    }

    fn handle_opened(&mut self, now: E::Instant) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connecting {
            debug!(state = %self.state, "ignoring late open");
            return Vec::new();
        }

        let Some(name) = self.session.as_ref().map(|s| s.display_name().to_string()) else {
            return self.handle_open_failed("no session");
        };

        let mut actions = Vec::new();
        actions.extend(self.transition(ConnectionState::Connected));
        self.heartbeat.start(now);

        actions.push(ConnectionAction::Send(Frame::Join {
            participant_id: self.participant_id.clone(),
            display_name: name.clone(),
            timestamp: self.env.wall_clock().timestamp_millis(),
        }));

        let notice = self.system_notice(self.config.locale.joined(&name));
        if self.store.append(notice.clone()) {
            actions.push(ConnectionAction::MessagesChanged);
        }
        actions.push(ConnectionAction::Send(Frame::Message { data: notice }));

        info!(participant_id = %self.participant_id, "connected to relay");
        actions
    }

    fn handle_open_failed(&mut self, reason: &str) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connecting {
            debug!(state = %self.state, reason, "ignoring open failure");
            return Vec::new();
        }

        warn!(reason, "relay unreachable, falling back to local mode");

        let mut actions = Vec::new();
        actions.extend(self.transition(ConnectionState::LocalFallback));

        let notice = self.system_notice(self.config.locale.local_only());
        if self.store.append(notice) {
            actions.push(ConnectionAction::MessagesChanged);
        }
        actions
    }

    fn handle_transport_lost(&mut self, reason: &str) -> Vec<ConnectionAction> {
        match self.state {
            ConnectionState::Connected => {
                warn!(reason, "relay connection lost");
                self.transition(ConnectionState::Disconnected).into_iter().collect()
            },
            ConnectionState::Connecting => self.handle_open_failed(reason),
            ConnectionState::Closing => self.transition(ConnectionState::Disconnected).into_iter().collect(),
            ConnectionState::Disconnected | ConnectionState::LocalFallback => Vec::new(),
        }
    }

    fn handle_closed(&mut self) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Closing {
            return Vec::new();
        }
        self.transition(ConnectionState::Disconnected).into_iter().collect()
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connected || !self.heartbeat.poll(now) {
            return Vec::new();
        }

        vec![ConnectionAction::Send(Frame::Ping { participant_id: self.participant_id.clone() })]
    }

    /// Move to `next`, stopping the heartbeat when leaving `Connected`.
    fn transition(&mut self, next: ConnectionState) -> Option<ConnectionAction> {
        if self.state == next {
            return None;
        }

        if self.state == ConnectionState::Connected {
            self.heartbeat.stop();
        }

        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
        Some(ConnectionAction::StateChanged(next))
    }

    fn system_notice(&self, text: impl Into<String>) -> Message {
        Message::system(
            self.next_message_id(),
            self.config.locale.system_author(),
            text,
            self.display_time(),
        )
    }

    fn next_message_id(&self) -> MessageId {
        MessageId::generate(self.env.wall_clock().timestamp_millis(), self.env.random_u64())
    }

    fn display_time(&self) -> String {
        self.env.wall_clock().format(DISPLAY_TIME_FORMAT).to_string()
    }
}
