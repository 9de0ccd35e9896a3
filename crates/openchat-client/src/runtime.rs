//! Generic runtime for connection orchestration.
//!
//! The Runtime drives a single event loop, coordinating between:
//! - [`ConnectionManager`]: sans-IO connection state machine
//! - [`Driver`]: platform-specific transport
//! - [`Observer`]: presentation-layer callbacks
//!
//! Events are processed strictly in arrival order. Each one yields a batch of
//! actions which is executed to completion before the next event is taken, so
//! observers see every state change in order. Nothing in a batch waits on the
//! relay handshake: opening is started by the driver and its outcome comes
//! back as a later event, raced against the connect deadline.

use std::{collections::VecDeque, time::Duration};

use openchat_core::{ConnectionAction, ConnectionEvent, ConnectionManager, Environment};
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{ClientHandle, Command, Driver, Observer, RuntimeConfig, TransportEvent};

/// Generic runtime that orchestrates the connection manager and a driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for clocks and randomness
/// - `O`: Presentation-layer observer
pub struct Runtime<D, E, O>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
    O: Observer,
{
    driver: D,
    conn: ConnectionManager<E>,
    observer: O,
    commands: mpsc::UnboundedReceiver<Command>,
    relay_url: String,
    tick_interval: Duration,
    connect_timeout: Duration,
    /// Whether the driver holds a connection, open or still opening.
    transport_active: bool,
    /// Deadline for the pending open. `None` unless opening.
    connect_deadline: Option<time::Instant>,
    /// Send failure seen while executing the current batch.
    lost: Option<String>,
}

impl<D, E, O> Runtime<D, E, O>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
    O: Observer,
{
    /// Create a runtime and the handle used to command it.
    pub fn new(driver: D, env: E, observer: O, config: RuntimeConfig) -> (Self, ClientHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let conn = ConnectionManager::new(env, config.connection);

        let runtime = Self {
            driver,
            conn,
            observer,
            commands,
            relay_url: config.relay_url,
            tick_interval: config.tick_interval,
            connect_timeout: config.connect_timeout,
            transport_active: false,
            connect_deadline: None,
            lost: None,
        };

        (runtime, ClientHandle::new(tx))
    }

    /// Connection state machine, for inspection.
    pub fn connection(&self) -> &ConnectionManager<E> {
        &self.conn
    }

    /// Run the event loop until every [`ClientHandle`] is dropped.
    ///
    /// Teardown runs on the way out regardless of state: the heartbeat is
    /// cancelled and, if still connected, the leave notification is sent
    /// before the connection is released.
    pub async fn run(mut self) {
        self.event_loop().await;
        self.teardown().await;
    }

    async fn event_loop(&mut self) {
        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = self.connect_deadline;

            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("all client handles dropped");
                        break;
                    };
                    self.handle_command(command).await;
                },
                event = self.driver.recv_frame(), if self.transport_active => {
                    let event = self.transport_event(event);
                    let actions = self.conn.handle(event);
                    self.execute(actions).await;
                },
                () = time::sleep_until(deadline.unwrap_or_else(time::Instant::now)), if deadline.is_some() => {
                    self.connect_timed_out().await;
                },
                _ = ticker.tick() => {
                    let now = self.driver.now();
                    let actions = self.conn.handle(ConnectionEvent::Tick { now });
                    self.execute(actions).await;
                },
            }
        }
    }

    async fn teardown(&mut self) {
        let actions = self.conn.disconnect();
        self.execute(actions).await;

        if self.transport_active {
            self.driver.close().await;
            self.release_transport();
        }
        self.driver.stop();
        info!(state = %self.conn.state(), "runtime stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        let actions = match command {
            Command::JoinAs(name) => match self.conn.connect(&name) {
                Ok(actions) => {
                    if let Some(session) = self.conn.session() {
                        self.observer.on_session(session);
                    }
                    actions
                },
                Err(e) => {
                    warn!(error = %e, "join rejected");
                    self.observer.on_command_rejected(&e);
                    return;
                },
            },
            Command::SendText(text) => self.conn.send_text(&text),
            Command::Leave => self.conn.disconnect(),
        };

        self.execute(actions).await;
    }

    async fn connect_timed_out(&mut self) {
        warn!(timeout = ?self.connect_timeout, "relay connect timed out");
        self.driver.stop();
        self.release_transport();

        let reason = format!("connect timed out after {:?}", self.connect_timeout);
        let actions = self.conn.handle(ConnectionEvent::OpenFailed { reason });
        self.execute(actions).await;
    }

    fn transport_event(&mut self, event: Option<TransportEvent>) -> ConnectionEvent<E::Instant> {
        match event {
            Some(TransportEvent::Opened) => {
                self.connect_deadline = None;
                ConnectionEvent::Opened { now: self.driver.now() }
            },
            Some(TransportEvent::Frame(text)) => ConnectionEvent::FrameReceived(text),
            Some(TransportEvent::Error(reason)) => {
                self.release_transport();
                ConnectionEvent::TransportError { reason }
            },
            Some(TransportEvent::Closed) | None => {
                self.release_transport();
                ConnectionEvent::TransportClosed
            },
        }
    }

    fn release_transport(&mut self) {
        self.transport_active = false;
        self.connect_deadline = None;
    }

    /// Execute a batch of actions, including any actions produced by the
    /// transport events they cause.
    ///
    /// A failed send is reported to the state machine only after the batch
    /// completes, so the remaining actions of a leave sequence still run in
    /// order.
    async fn execute(&mut self, actions: Vec<ConnectionAction>) {
        let mut pending = VecDeque::from(actions);

        loop {
            while let Some(action) = pending.pop_front() {
                if let Some(event) = self.execute_one(action).await {
                    pending.extend(self.conn.handle(event));
                }
            }

            match self.lost.take() {
                Some(reason) => pending.extend(self.conn.handle(ConnectionEvent::TransportError { reason })),
                None => break,
            }
        }
    }

    async fn execute_one(&mut self, action: ConnectionAction) -> Option<ConnectionEvent<E::Instant>> {
        match action {
            ConnectionAction::Open => match self.driver.connect(&self.relay_url).await {
                Ok(()) => {
                    self.transport_active = true;
                    self.connect_deadline = Some(time::Instant::now() + self.connect_timeout);
                    None
                },
                Err(e) => Some(ConnectionEvent::OpenFailed { reason: e.to_string() }),
            },
            ConnectionAction::Send(frame) => {
                if !self.transport_active {
                    debug!(frame_type = frame.frame_type(), "transport closed, frame dropped");
                    return None;
                }

                if let Err(e) = self.driver.send_frame(&frame).await {
                    warn!(error = %e, frame_type = frame.frame_type(), "send failed");
                    self.release_transport();
                    self.lost.get_or_insert_with(|| e.to_string());
                }
                None
            },
            ConnectionAction::Close => {
                if self.transport_active {
                    self.driver.close().await;
                }
                self.release_transport();
                Some(ConnectionEvent::Closed)
            },
            ConnectionAction::StateChanged(state) => {
                self.observer.on_state_change(state);
                None
            },
            ConnectionAction::MessagesChanged => {
                self.observer.on_messages_change(self.conn.messages());
                None
            },
            ConnectionAction::PresenceChanged(count) => {
                self.observer.on_presence_change(count);
                None
            },
        }
    }
}

impl<D, E, O> Drop for Runtime<D, E, O>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
    O: Observer,
{
    fn drop(&mut self) {
        self.driver.stop();
    }
}
