//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the WebSocket driver but for
//! deterministic testing, so the same [`openchat_client::Runtime`]
//! orchestration code runs in both production and simulation. Tests steer it
//! through a [`SimDriverHandle`]: inject inbound frames, force connect or send
//! failures, hold a connect open forever, drop the connection, and inspect
//! what was sent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use openchat_client::{Driver, TransportEvent};
use openchat_proto::Frame;
use tokio::sync::mpsc;

use crate::SimRelay;

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// State shared between a driver and its handle.
#[derive(Debug, Default)]
struct Shared {
    outgoing: Vec<Frame>,
    connected: bool,
    connect_urls: Vec<String>,
    fail_connect: Option<String>,
    hang_connect: bool,
    fail_sends: Option<String>,
    closes: usize,
    stopped: bool,
    relay: Option<(SimRelay, u64)>,
}

impl Shared {
    fn disconnect(&mut self) {
        self.connected = false;
        if let Some((relay, peer)) = &self.relay {
            relay.detach(*peer);
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    shared: Arc<Mutex<Shared>>,
    inbound_tx: mpsc::UnboundedSender<TransportEvent>,
    inbound_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Test-side control of a [`SimDriver`].
#[derive(Debug, Clone)]
pub struct SimDriverHandle {
    shared: Arc<Mutex<Shared>>,
    inbound_tx: mpsc::UnboundedSender<TransportEvent>,
}

impl SimDriver {
    /// Create a standalone driver and its handle.
    ///
    /// Every connect succeeds and nothing is echoed until the handle says
    /// otherwise.
    pub fn new() -> (Self, SimDriverHandle) {
        Self::build(None)
    }

    /// Create a driver whose connection goes through `relay` as participant
    /// `peer`.
    pub(crate) fn attached(relay: SimRelay, peer: u64) -> (Self, SimDriverHandle) {
        Self::build(Some((relay, peer)))
    }

    fn build(relay: Option<(SimRelay, u64)>) -> (Self, SimDriverHandle) {
        let shared = Arc::new(Mutex::new(Shared { relay, ..Shared::default() }));
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let handle = SimDriverHandle { shared: Arc::clone(&shared), inbound_tx: inbound_tx.clone() };
        (Self { shared, inbound_tx, inbound_rx }, handle)
    }
}

impl SimDriverHandle {
    /// Deliver a frame as if the relay sent it.
    pub fn inject_frame(&self, frame: &Frame) {
        if let Ok(text) = frame.encode() {
            self.inject_text(text);
        }
    }

    /// Deliver raw text as if the relay sent it.
    pub fn inject_text(&self, text: impl Into<String>) {
        let _ = self.inbound_tx.send(TransportEvent::Frame(text.into()));
    }

    /// Close the connection from the relay side.
    pub fn drop_connection(&self) {
        lock(&self.shared).disconnect();
        let _ = self.inbound_tx.send(TransportEvent::Closed);
    }

    /// Fail the connection with a transport error.
    pub fn inject_error(&self, reason: impl Into<String>) {
        lock(&self.shared).disconnect();
        let _ = self.inbound_tx.send(TransportEvent::Error(reason.into()));
    }

    /// Make every following connect attempt fail with `reason`.
    pub fn fail_connect(&self, reason: impl Into<String>) {
        lock(&self.shared).fail_connect = Some(reason.into());
    }

    /// Make every following connect attempt stay pending forever.
    pub fn hang_connect(&self) {
        lock(&self.shared).hang_connect = true;
    }

    /// Make every following send fail with `reason`.
    pub fn fail_sends(&self, reason: impl Into<String>) {
        lock(&self.shared).fail_sends = Some(reason.into());
    }

    /// Take all frames sent so far.
    pub fn take_outgoing(&self) -> Vec<Frame> {
        std::mem::take(&mut lock(&self.shared).outgoing)
    }

    /// Copy of all frames sent and not yet taken.
    pub fn outgoing(&self) -> Vec<Frame> {
        lock(&self.shared).outgoing.clone()
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        lock(&self.shared).connected
    }

    /// URLs of every connect attempt, in order.
    pub fn connect_urls(&self) -> Vec<String> {
        lock(&self.shared).connect_urls.clone()
    }

    /// Number of graceful closes.
    pub fn close_count(&self) -> usize {
        lock(&self.shared).closes
    }

    /// Whether the driver was stopped.
    pub fn is_stopped(&self) -> bool {
        lock(&self.shared).stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = tokio::time::Instant;

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        let mut shared = lock(&self.shared);
        shared.connect_urls.push(url.to_string());

        if let Some(reason) = shared.fail_connect.clone() {
            return Err(SimDriverError(reason));
        }

        // events from an earlier connection never leak into this one
        while self.inbound_rx.try_recv().is_ok() {}

        shared.stopped = false;
        if shared.hang_connect {
            return Ok(());
        }

        shared.connected = true;
        let _ = self.inbound_tx.send(TransportEvent::Opened);
        if let Some((relay, peer)) = &shared.relay {
            relay.attach(*peer, self.inbound_tx.clone());
        }
        Ok(())
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        let mut shared = lock(&self.shared);
        if !shared.connected {
            return Err(SimDriverError("not connected".to_string()));
        }
        if let Some(reason) = shared.fail_sends.clone() {
            return Err(SimDriverError(reason));
        }

        shared.outgoing.push(frame.clone());
        if let Some((relay, _)) = &shared.relay {
            relay.broadcast(frame);
        }
        Ok(())
    }

    async fn recv_frame(&mut self) -> Option<TransportEvent> {
        self.inbound_rx.recv().await
    }

    async fn close(&mut self) {
        let mut shared = lock(&self.shared);
        shared.closes += 1;
        shared.disconnect();
    }

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn stop(&mut self) {
        let mut shared = lock(&self.shared);
        shared.stopped = true;
        shared.disconnect();
    }
}
