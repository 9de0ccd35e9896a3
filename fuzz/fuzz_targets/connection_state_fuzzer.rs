//! Fuzz target for the connection state machine
//!
//! # Strategy
//!
//! - Commands: connect under assorted names, send text, disconnect
//! - Transport: open success and failure, close, error, arbitrary inbound text
//! - Time: ticks at arbitrary offsets
//!
//! # Invariants
//!
//! - Message ids are unique and history is append-only
//! - Heartbeat runs exactly while connected
//! - Local fallback is terminal and never transmits

#![no_main]

use std::{collections::HashSet, time::Duration};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use openchat_core::{
    ConnectionAction, ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionState, Environment, Message,
};
use openchat_harness::SimEnv;

#[derive(Debug, Clone, Arbitrary)]
enum ConnectionOp {
    Connect { name: String },
    Opened,
    OpenFailed,
    Inbound { text: String },
    SendText { text: String },
    Disconnect,
    TransportClosed,
    TransportError,
    Closed,
    Tick { secs: u16 },
}

fuzz_target!(|ops: Vec<ConnectionOp>| {
    let env = SimEnv::with_seed(0);
    let start = env.now();
    let mut elapsed = Duration::ZERO;
    let mut conn = ConnectionManager::new(env, ConnectionConfig::default());
    let mut history: Vec<Message> = Vec::new();

    for op in ops {
        let was_fallback = conn.state() == ConnectionState::LocalFallback;

        let actions = match op {
            ConnectionOp::Connect { name } => conn.connect(&name).unwrap_or_default(),
            ConnectionOp::Opened => conn.handle(ConnectionEvent::Opened { now: start + elapsed }),
            ConnectionOp::OpenFailed => conn.handle(ConnectionEvent::OpenFailed { reason: "fuzz".into() }),
            ConnectionOp::Inbound { text } => conn.receive(&text),
            ConnectionOp::SendText { text } => conn.send_text(&text),
            ConnectionOp::Disconnect => conn.disconnect(),
            ConnectionOp::TransportClosed => conn.handle(ConnectionEvent::TransportClosed),
            ConnectionOp::TransportError => conn.handle(ConnectionEvent::TransportError { reason: "fuzz".into() }),
            ConnectionOp::Closed => conn.handle(ConnectionEvent::Closed),
            ConnectionOp::Tick { secs } => {
                elapsed += Duration::from_secs(u64::from(secs));
                conn.handle(ConnectionEvent::Tick { now: start + elapsed })
            },
        };

        let ids: HashSet<_> = conn.messages().iter().map(|m| &m.id).collect();
        assert_eq!(ids.len(), conn.messages().len(), "duplicate message id");
        assert!(conn.messages().starts_with(&history), "history rewritten");
        history = conn.messages().to_vec();

        assert_eq!(conn.heartbeat_running(), conn.state() == ConnectionState::Connected);

        if was_fallback {
            assert_eq!(conn.state(), ConnectionState::LocalFallback);
            assert!(!actions.iter().any(|a| matches!(a, ConnectionAction::Send(_) | ConnectionAction::Open)));
        }
    }
});
