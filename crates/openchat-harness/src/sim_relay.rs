//! In-process relay for multi-client simulation.
//!
//! Behaves like the public broadcast relay: every frame a participant sends
//! is forwarded to every connected participant, the sender included, and each
//! arrival or departure is followed by a `userCount` frame to everyone.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use openchat_client::TransportEvent;
use openchat_proto::Frame;
use tokio::sync::mpsc;
use tracing::trace;

use crate::{SimDriver, SimDriverHandle};

#[derive(Debug, Default)]
struct RelayState {
    /// Connected participants by peer id.
    peers: BTreeMap<u64, mpsc::UnboundedSender<TransportEvent>>,
    /// Peer id for the next driver.
    next_peer: u64,
    /// Every frame relayed from a participant, in order.
    log: Vec<Frame>,
}

/// Shared in-memory relay.
#[derive(Debug, Clone, Default)]
pub struct SimRelay {
    state: Arc<Mutex<RelayState>>,
}

impl SimRelay {
    /// Create an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver that connects through this relay.
    pub fn driver(&self) -> (SimDriver, SimDriverHandle) {
        let peer = {
            let mut state = self.lock();
            state.next_peer += 1;
            state.next_peer
        };
        SimDriver::attached(self.clone(), peer)
    }

    /// Number of connected participants.
    pub fn participants(&self) -> usize {
        self.lock().peers.len()
    }

    /// Every frame relayed from a participant, in order.
    pub fn log(&self) -> Vec<Frame> {
        self.lock().log.clone()
    }

    /// Drop every connection from the relay side.
    pub fn shutdown(&self) {
        let peers = std::mem::take(&mut self.lock().peers);
        for tx in peers.values() {
            let _ = tx.send(TransportEvent::Closed);
        }
    }

    pub(crate) fn attach(&self, peer: u64, tx: mpsc::UnboundedSender<TransportEvent>) {
        let mut state = self.lock();
        state.peers.insert(peer, tx);
        Self::announce_count(&state);
    }

    pub(crate) fn detach(&self, peer: u64) {
        let mut state = self.lock();
        if state.peers.remove(&peer).is_some() {
            Self::announce_count(&state);
        }
    }

    pub(crate) fn broadcast(&self, frame: &Frame) {
        let mut state = self.lock();
        state.log.push(frame.clone());
        Self::send_all(&state, frame);
    }

    fn announce_count(state: &RelayState) {
        let count = state.peers.len() as u64;
        Self::send_all(state, &Frame::UserCount { count });
    }

    fn send_all(state: &RelayState, frame: &Frame) {
        let Ok(text) = frame.encode() else {
            return;
        };

        trace!(frame_type = frame.frame_type(), peers = state.peers.len(), "relaying frame");
        for tx in state.peers.values() {
            let _ = tx.send(TransportEvent::Frame(text.clone()));
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use openchat_client::Driver;

    use super::*;

    #[tokio::test]
    async fn frames_echo_to_every_peer() {
        let relay = SimRelay::new();
        let (mut a, _) = relay.driver();
        let (mut b, _) = relay.driver();

        a.connect("sim://relay").await.unwrap();
        b.connect("sim://relay").await.unwrap();
        assert_eq!(relay.participants(), 2);

        let ping = Frame::Ping { participant_id: "a".into() };
        a.send_frame(&ping).await.unwrap();

        assert_eq!(a.recv_frame().await, Some(TransportEvent::Opened));
        assert_eq!(b.recv_frame().await, Some(TransportEvent::Opened));

        // a saw count=1, count=2, then its own ping
        let expected = [
            Frame::UserCount { count: 1 },
            Frame::UserCount { count: 2 },
            ping.clone(),
        ];
        for frame in expected {
            let Some(TransportEvent::Frame(text)) = a.recv_frame().await else {
                panic!("expected frame");
            };
            assert_eq!(Frame::decode(&text).unwrap(), frame);
        }

        // b joined second: count=2, then the ping
        let Some(TransportEvent::Frame(text)) = b.recv_frame().await else {
            panic!("expected frame");
        };
        assert_eq!(Frame::decode(&text).unwrap(), Frame::UserCount { count: 2 });
        let Some(TransportEvent::Frame(text)) = b.recv_frame().await else {
            panic!("expected frame");
        };
        assert_eq!(Frame::decode(&text).unwrap(), ping);

        assert_eq!(relay.log(), vec![ping]);
    }

    #[tokio::test]
    async fn departures_update_count() {
        let relay = SimRelay::new();
        let (mut a, _) = relay.driver();
        let (mut b, _) = relay.driver();
        a.connect("sim://relay").await.unwrap();
        b.connect("sim://relay").await.unwrap();

        b.close().await;
        assert_eq!(relay.participants(), 1);

        // opened, count=1, count=2, count=1
        let mut last = None;
        for _ in 0..4 {
            if let Some(TransportEvent::Frame(text)) = a.recv_frame().await {
                last = Some(Frame::decode(&text).unwrap());
            }
        }
        assert_eq!(last, Some(Frame::UserCount { count: 1 }));
    }
}
