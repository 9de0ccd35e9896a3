//! Wire-format tests for relay frames.
//!
//! Snapshots pin the exact JSON other relay participants see. Properties check
//! that decoding arbitrary text never panics and that every frame this client
//! sends decodes back to itself.

use openchat_proto::{Frame, Message, MessageId, ProtocolError};
use proptest::prelude::*;

fn sample_message(is_system: bool) -> Message {
    let id = MessageId::generate(1_700_000_000_000, 0xabcd);
    if is_system {
        Message::system(id, "System", "alice joined", "09:30")
    } else {
        Message::user(id, "alice", "hello", "09:30")
    }
}

#[test]
fn join_wire_format() {
    let frame = Frame::Join {
        participant_id: "user_1700000000000_k3j4h5g6f".to_string(),
        display_name: "alice".to_string(),
        timestamp: 1_700_000_000_000,
    };

    insta::assert_snapshot!(
        frame.encode().unwrap(),
        @r#"{"type":"join","participantId":"user_1700000000000_k3j4h5g6f","displayName":"alice","timestamp":1700000000000}"#
    );
}

#[test]
fn leave_and_ping_wire_format() {
    let leave = Frame::Leave { participant_id: "p-1".to_string() };
    let ping = Frame::Ping { participant_id: "p-1".to_string() };

    insta::assert_snapshot!(leave.encode().unwrap(), @r#"{"type":"leave","participantId":"p-1"}"#);
    insta::assert_snapshot!(ping.encode().unwrap(), @r#"{"type":"ping","participantId":"p-1"}"#);
}

#[test]
fn message_wire_format() {
    let frame = Frame::Message { data: sample_message(false) };

    insta::assert_snapshot!(
        frame.encode().unwrap(),
        @r#"{"type":"message","data":{"id":"1700000000000-000000000000abcd","user":"alice","text":"hello","time":"09:30","isSystem":false}}"#
    );
}

#[test]
fn system_message_wire_format() {
    let frame = Frame::Message { data: sample_message(true) };

    insta::assert_snapshot!(
        frame.encode().unwrap(),
        @r#"{"type":"message","data":{"id":"1700000000000-000000000000abcd","user":"System","text":"alice joined","time":"09:30","isSystem":true}}"#
    );
}

#[test]
fn extra_fields_are_ignored() {
    let frame =
        Frame::decode(r#"{"type":"userCount","count":4,"room":"demo","server":"relay-1"}"#).unwrap();
    assert_eq!(frame, Frame::UserCount { count: 4 });
}

/// Strategy for frames this client sends.
fn outbound_frame() -> impl Strategy<Value = Frame> {
    let text = "\\PC{0,40}";
    prop_oneof![
        (text, text, any::<i64>()).prop_map(|(participant_id, display_name, timestamp)| {
            Frame::Join { participant_id, display_name, timestamp }
        }),
        text.prop_map(|participant_id| Frame::Leave { participant_id }),
        text.prop_map(|participant_id| Frame::Ping { participant_id }),
        (any::<i64>(), any::<u64>(), text, text, any::<bool>()).prop_map(
            |(millis, random, author, body, is_system)| {
                let id = MessageId::generate(millis, random);
                let data = if is_system {
                    Message::system(id, author, body, "12:00")
                } else {
                    Message::user(id, author, body, "12:00")
                };
                Frame::Message { data }
            }
        ),
    ]
}

proptest! {
    #[test]
    fn prop_decode_never_panics(text in "\\PC{0,200}") {
        let _ = Frame::decode(&text);
    }

    #[test]
    fn prop_decode_arbitrary_json_objects_never_panics(
        kind in prop_oneof![
            Just("join"), Just("leave"), Just("message"), Just("ping"), Just("userCount"), Just("x")
        ],
        value in prop_oneof![
            Just("null".to_string()),
            any::<i64>().prop_map(|n| n.to_string()),
            "[a-z]{0,8}".prop_map(|s| format!("\"{s}\"")),
            Just("{}".to_string()),
        ],
    ) {
        let text = format!(r#"{{"type":"{kind}","data":{value},"count":{value},"participantId":{value}}}"#);
        match Frame::decode(&text) {
            Ok(_) | Err(ProtocolError::InvalidFrame(_)) => {},
            Err(other) => prop_assert!(false, "unexpected error for {}: {:?}", text, other),
        }
    }

    #[test]
    fn prop_outbound_frames_decode_to_themselves(frame in outbound_frame()) {
        let text = frame.encode().unwrap();
        prop_assert_eq!(Frame::decode(&text).unwrap(), frame);
    }
}
