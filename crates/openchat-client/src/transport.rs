//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which opens the socket in the background and
//! handles WebSocket I/O for text frames, and [`WebSocketDriver`] which plugs
//! it into the [`crate::Runtime`]. This is a thin layer that only moves
//! frames; protocol logic remains in the sans-IO connection manager.

use std::time::Duration;

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use openchat_proto::Frame;
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_tungstenite::{
    WebSocketStream, connect_async,
    tungstenite::{Message as WsMessage, client::IntoClientRequest},
};
use tracing::debug;

use crate::{Driver, TransportEvent};

/// Capacity of the channels between the driver and the connection task.
const CHANNEL_CAPACITY: usize = 64;

/// Time allowed for a graceful close before the connection task is aborted.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Outbound instruction for the connection task.
enum Outbound {
    Text(String),
    Close,
}

/// Handle to a WebSocket connection, open or still opening.
///
/// Frames are sent and received via channels; an internal task performs the
/// handshake and then the socket I/O.
pub struct ConnectedClient {
    to_relay: mpsc::Sender<Outbound>,
    from_relay: mpsc::Receiver<TransportEvent>,
    task: JoinHandle<()>,
}

impl ConnectedClient {
    /// Queue one text frame for sending.
    pub async fn send(&self, text: String) -> Result<(), TransportError> {
        self.to_relay
            .send(Outbound::Text(text))
            .await
            .map_err(|_| TransportError::Stream("connection task ended".to_string()))
    }

    /// Next event from the relay. `None` once the connection task has ended.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.from_relay.recv().await
    }

    /// Send a close frame and wait briefly for the task to finish.
    pub async fn close(mut self) {
        let _ = self.to_relay.send(Outbound::Close).await;
        if tokio::time::timeout(CLOSE_TIMEOUT, &mut self.task).await.is_err() {
            debug!("close timed out, aborting connection task");
            self.task.abort();
        }
    }

    /// Stop the connection.
    pub fn stop(&self) {
        self.task.abort();
    }
}

/// Start connecting to a relay via WebSocket.
///
/// Returns immediately. The handshake runs in the connection task, which
/// reports [`TransportEvent::Opened`] on success and
/// [`TransportEvent::Error`] on failure.
pub fn connect(url: &str) -> ConnectedClient {
    // A second install attempt fails harmlessly.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let (to_relay_tx, to_relay_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (from_relay_tx, from_relay_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let task = tokio::spawn(run_connection(url.to_string(), to_relay_rx, from_relay_tx));

    ConnectedClient { to_relay: to_relay_tx, from_relay: from_relay_rx, task }
}

/// Open the socket, then bridge between channels and the socket.
async fn run_connection(
    url: String,
    mut to_relay: mpsc::Receiver<Outbound>,
    from_relay: mpsc::Sender<TransportEvent>,
) {
    let stream = tokio::select! {
        result = connect_async(url.as_str()) => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                let _ = from_relay.send(TransportEvent::Error(e.to_string())).await;
                return;
            },
        },
        // only a close can arrive before the open is reported
        _ = to_relay.recv() => {
            debug!("connect abandoned");
            return;
        },
    };

    if from_relay.send(TransportEvent::Opened).await.is_err() {
        return;
    }

    let (write, read) = stream.split();

    // Independent halves: a full inbound queue never holds up outbound frames.
    tokio::select! {
        () = write_frames(write, to_relay, from_relay.clone()) => {},
        () = read_frames(read, from_relay) => {},
    }
}

/// Drain the outbound queue into the socket until a close is requested.
async fn write_frames<S>(
    mut write: SplitSink<WebSocketStream<S>, WsMessage>,
    mut to_relay: mpsc::Receiver<Outbound>,
    errors: mpsc::Sender<TransportEvent>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(Outbound::Text(text)) = to_relay.recv().await {
        if let Err(e) = write.send(WsMessage::text(text)).await {
            // a full inbound queue must not stall the writer; the next send
            // fails on the closed channel instead
            let _ = errors.try_send(TransportEvent::Error(e.to_string()));
            return;
        }
    }

    let _ = write.close().await;
}

/// Forward inbound text frames until the relay closes or fails.
async fn read_frames<S>(mut read: SplitStream<WebSocketStream<S>>, from_relay: mpsc::Sender<TransportEvent>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        match read.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                if from_relay.send(TransportEvent::Frame(text.as_str().to_owned())).await.is_err() {
                    return;
                }
            },
            Some(Ok(WsMessage::Close(_))) | None => {
                let _ = from_relay.send(TransportEvent::Closed).await;
                return;
            },
            Some(Ok(other)) => {
                debug!(kind = ?other, "ignoring non-text websocket message");
            },
            Some(Err(e)) => {
                let _ = from_relay.send(TransportEvent::Error(e.to_string())).await;
                return;
            },
        }
    }
}

/// [`Driver`] over a WebSocket connection.
#[derive(Default)]
pub struct WebSocketDriver {
    connection: Option<ConnectedClient>,
}

impl WebSocketDriver {
    /// Create a driver with no connection.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for WebSocketDriver {
    type Error = TransportError;
    type Instant = tokio::time::Instant;

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        url.into_client_request().map_err(|e| TransportError::Connection(e.to_string()))?;

        if let Some(old) = self.connection.take() {
            old.stop();
        }
        self.connection = Some(connect(url));
        Ok(())
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        let text = frame.encode().map_err(|e| TransportError::Protocol(e.to_string()))?;
        match &self.connection {
            Some(conn) => conn.send(text).await,
            None => Err(TransportError::Stream("not connected".to_string())),
        }
    }

    async fn recv_frame(&mut self) -> Option<TransportEvent> {
        match &mut self.connection {
            Some(conn) => conn.recv().await,
            None => None,
        }
    }

    async fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close().await;
        }
    }

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn stop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.stop();
        }
    }
}
