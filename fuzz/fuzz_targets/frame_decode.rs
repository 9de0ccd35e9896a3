//! Fuzz target for Frame::decode
//!
//! Relay traffic is untrusted text from any participant. Decoding must never
//! panic, and every frame that decodes to a known type must survive a
//! re-encode and decode unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use openchat_proto::Frame;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(frame) = Frame::decode(text) else {
        return;
    };
    if matches!(frame, Frame::Unknown) {
        return;
    }

    let encoded = frame.encode().expect("decoded frame must encode");
    let decoded = Frame::decode(&encoded).expect("encoded frame must decode");
    assert_eq!(decoded, frame);
});
