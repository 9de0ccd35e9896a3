//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from a specific transport. The
//! WebSocket driver talks to a real relay; the simulation driver feeds the
//! same [`crate::Runtime`] from in-memory queues under a paused clock.

use std::{future::Future, ops::Sub, time::Duration};

use openchat_proto::Frame;

/// What the transport delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection started by [`Driver::connect`] is open.
    Opened,
    /// One text frame from the relay, not yet decoded.
    Frame(String),
    /// The relay closed the connection.
    Closed,
    /// The connection failed.
    Error(String),
}

/// Abstracts I/O operations for the client runtime.
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Start opening a connection to the relay at `url`.
    ///
    /// Returns without waiting for the handshake. The outcome arrives through
    /// [`Driver::recv_frame`]: [`TransportEvent::Opened`] once the
    /// connection is usable, or `Error`/`Closed` if it never opens.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot even be started.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send one frame to the relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the write fails.
    fn send_frame(&mut self, frame: &Frame) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Wait for the next transport event.
    ///
    /// Must be cancel-safe: the runtime polls it inside `select!`. Returns
    /// `None` if no connection is open or opening.
    fn recv_frame(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Close the connection gracefully, waiting briefly for the close to
    /// complete. A connection still opening is abandoned.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Stop the connection immediately and release its resources.
    fn stop(&mut self);
}
