//! Property-based tests for the connection state machine.
//!
//! Arbitrary sequences of commands and transport events are applied to a
//! `ConnectionManager`; the invariants below must hold after every step.

use std::{collections::HashSet, time::Duration};

use openchat_core::{
    ConnectionAction, ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionState, Environment, Frame,
    Message, MessageStore, PresenceCounter,
};
use openchat_harness::SimEnv;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Connect(&'static str),
    Opened,
    OpenFailed,
    InboundMessage(u8),
    InboundCount(u64),
    InboundGarbage(String),
    SendText(String),
    Disconnect,
    TransportClosed,
    TransportError,
    Closed,
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => prop::sample::select(vec!["alice", "bob", "  alice  ", ""]).prop_map(Op::Connect),
        2 => Just(Op::Opened),
        1 => Just(Op::OpenFailed),
        3 => (0u8..8).prop_map(Op::InboundMessage),
        1 => (0u64..10).prop_map(Op::InboundCount),
        1 => ".{0,16}".prop_map(Op::InboundGarbage),
        3 => "[ a-z]{0,8}".prop_map(Op::SendText),
        1 => Just(Op::Disconnect),
        1 => Just(Op::TransportClosed),
        1 => Just(Op::TransportError),
        1 => Just(Op::Closed),
        2 => (1u64..45).prop_map(Op::Advance),
    ]
}

fn inbound(id: u8) -> String {
    let data = Message::user(format!("peer-{id}").as_str().into(), "peer", "hello", "10:00");
    Frame::Message { data }.encode().unwrap_or_default()
}

fn sends(actions: &[ConnectionAction]) -> usize {
    actions.iter().filter(|a| matches!(a, ConnectionAction::Send(_))).count()
}

proptest! {
    /// Core invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_connection_invariants(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let env = SimEnv::with_seed(3);
        let start = env.now();
        let mut elapsed = Duration::ZERO;
        let mut conn = ConnectionManager::new(env, ConnectionConfig::default());

        let mut last_count = 1;
        let mut previous: Vec<Message> = Vec::new();
        let mut fell_back = false;
        let participant_id = conn.participant_id().to_string();

        for op in ops {
            let before = conn.state();
            let now = start + elapsed;

            let actions = match &op {
                Op::Connect(name) => conn.connect(name).unwrap_or_default(),
                Op::Opened => conn.handle(ConnectionEvent::Opened { now }),
                Op::OpenFailed => conn.handle(ConnectionEvent::OpenFailed { reason: "refused".into() }),
                Op::InboundMessage(id) => conn.handle(ConnectionEvent::FrameReceived(inbound(*id))),
                Op::InboundCount(count) => {
                    last_count = *count;
                    conn.receive(&format!(r#"{{"type":"userCount","count":{count}}}"#))
                },
                Op::InboundGarbage(text) => conn.receive(text),
                Op::SendText(text) => conn.send_text(text),
                Op::Disconnect => conn.disconnect(),
                Op::TransportClosed => conn.handle(ConnectionEvent::TransportClosed),
                Op::TransportError => conn.handle(ConnectionEvent::TransportError { reason: "reset".into() }),
                Op::Closed => conn.handle(ConnectionEvent::Closed),
                Op::Advance(secs) => {
                    elapsed += Duration::from_secs(*secs);
                    conn.handle(ConnectionEvent::Tick { now: start + elapsed })
                },
            };

            // uniqueness
            let ids: HashSet<_> = conn.messages().iter().map(|m| m.id.clone()).collect();
            prop_assert_eq!(ids.len(), conn.messages().len());

            // append-only
            prop_assert!(conn.messages().starts_with(&previous), "history rewritten by {:?}", op);
            previous = conn.messages().to_vec();

            // heartbeat runs exactly while connected
            prop_assert_eq!(conn.heartbeat_running(), conn.state() == ConnectionState::Connected);

            // frames only leave a connected client, or one completing its open
            if before != ConnectionState::Connected && !matches!(op, Op::Opened) {
                prop_assert_eq!(sends(&actions), 0, "unexpected send after {:?} in {:?}", op, before);
            }

            // fallback is terminal and silent
            if fell_back {
                prop_assert_eq!(conn.state(), ConnectionState::LocalFallback);
                prop_assert_eq!(sends(&actions), 0);
            }
            fell_back |= conn.state() == ConnectionState::LocalFallback;

            prop_assert_eq!(conn.presence(), last_count);
            prop_assert_eq!(conn.participant_id(), participant_id.as_str());
        }
    }

    /// Every fallback leaves exactly one system notice behind.
    #[test]
    fn prop_fallback_single_notice(texts in prop::collection::vec("[a-z]{1,8}", 0..10)) {
        let mut conn = ConnectionManager::new(SimEnv::new(), ConnectionConfig::default());
        conn.connect("alice").unwrap_or_default();
        conn.handle(ConnectionEvent::OpenFailed { reason: "refused".into() });

        for text in &texts {
            prop_assert_eq!(sends(&conn.send_text(text)), 0);
        }

        prop_assert_eq!(conn.messages().iter().filter(|m| m.is_system).count(), 1);
        prop_assert_eq!(conn.messages().len(), texts.len() + 1);
    }

    /// Appending any sequence with repeats keeps the first occurrence of each
    /// id, in first-seen order.
    #[test]
    fn prop_store_dedup_preserves_first_order(ids in prop::collection::vec(0u8..16, 0..64)) {
        let mut store = MessageStore::new();
        let mut expected = Vec::new();

        for (n, id) in ids.iter().enumerate() {
            let message = Message::user(id.to_string().as_str().into(), "a", n.to_string(), "10:00");
            let fresh = !expected.contains(id);
            prop_assert_eq!(store.append(message), fresh);
            if fresh {
                expected.push(*id);
            }
        }

        let stored: Vec<String> = store.iter().map(|m| m.id.as_str().to_string()).collect();
        let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
        prop_assert_eq!(stored, expected);
    }

    /// The presence counter always reports the last value written.
    #[test]
    fn prop_presence_last_write_wins(counts in prop::collection::vec(any::<u64>(), 1..32)) {
        let mut presence = PresenceCounter::new();
        for count in &counts {
            presence.set(*count);
        }
        prop_assert_eq!(Some(presence.get()), counts.last().copied());
    }
}
